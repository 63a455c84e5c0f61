use super::curve::Curve;
use crate::core::error::AnalysisError;
use crate::core::math::interpolation::LinearInterpolator;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Curves from independent runs, keyed by run id and iterated in key order.
///
/// Each entry keeps its own x support; [`CurveSet::regrid`] puts every entry onto the
/// common grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurveSet {
    entries: BTreeMap<String, Curve>,
}

impl CurveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the curve stored under `key`.
    pub fn insert(&mut self, key: impl Into<String>, curve: Curve) -> Option<Curve> {
        self.entries.insert(key.into(), curve)
    }

    /// Convenience form of [`insert`](Self::insert) that validates raw columns first.
    pub fn insert_xy(
        &mut self,
        key: impl Into<String>,
        x: Vec<f64>,
        y: Vec<f64>,
    ) -> Result<(), AnalysisError> {
        let curve = Curve::new(x, y)?;
        self.entries.insert(key.into(), curve);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Curve> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Curve)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Adds every entry of `other` whose key is not present yet. Existing entries win.
    ///
    /// Returns the number of entries taken from `other`.
    pub fn merge(&mut self, other: CurveSet) -> usize {
        let mut added = 0;
        for (key, curve) in other.entries {
            if let Entry::Vacant(slot) = self.entries.entry(key) {
                slot.insert(curve);
                added += 1;
            }
        }
        added
    }

    /// Keeps the first `len` points of every entry.
    pub fn truncate(&mut self, len: usize) -> Result<(), AnalysisError> {
        for curve in self.entries.values_mut() {
            curve.truncate(len)?;
        }
        Ok(())
    }

    /// Sorted, deduplicated union of every x value across all entries.
    pub fn common_grid(&self) -> Vec<f64> {
        let mut grid: Vec<f64> = self
            .entries
            .values()
            .flat_map(|curve| curve.x().iter().copied())
            .collect();
        grid.sort_by(f64::total_cmp);
        grid.dedup();
        grid
    }

    /// Re-evaluates each entry on `grid` by linear interpolation, extrapolating outside an
    /// entry's own support.
    pub fn regridded(&self, grid: &[f64]) -> Result<CurveSet, AnalysisError> {
        let entries = self
            .entries
            .iter()
            .map(|(key, curve)| {
                let interp = LinearInterpolator::new(curve.x(), curve.y())?;
                let y = interp.interpolate_all(grid);
                Ok((key.clone(), Curve::new(grid.to_vec(), y)?))
            })
            .collect::<Result<BTreeMap<_, _>, AnalysisError>>()?;
        Ok(CurveSet { entries })
    }

    /// Replaces every entry by its form on [`common_grid`](Self::common_grid).
    pub fn regrid(&mut self) -> Result<(), AnalysisError> {
        let grid = self.common_grid();
        *self = self.regridded(&grid)?;
        Ok(())
    }

    pub fn concatenated_x(&self) -> Vec<f64> {
        self.entries
            .values()
            .flat_map(|curve| curve.x().iter().copied())
            .collect()
    }

    pub fn concatenated_y(&self) -> Vec<f64> {
        self.entries
            .values()
            .flat_map(|curve| curve.y().iter().copied())
            .collect()
    }

    pub fn joined_keys(&self, separator: &str) -> String {
        self.keys().collect::<Vec<_>>().join(separator)
    }
}

impl FromIterator<(String, Curve)> for CurveSet {
    fn from_iter<I: IntoIterator<Item = (String, Curve)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
