use crate::core::error::AnalysisError;
use crate::core::math::statistics::{self, PointSummary};
use crate::core::models::curve::Curve;
use crate::core::models::curve_set::CurveSet;
use tracing::{info, instrument};

/// Cross-run mean and population standard deviation on a common grid.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedCurve {
    pub grid: Vec<f64>,
    pub mean: Vec<f64>,
    pub std_dev: Vec<f64>,
    pub runs: usize,
}

impl AggregatedCurve {
    pub fn mean_curve(&self) -> Curve {
        Curve::from_points(self.grid.iter().copied().zip(self.mean.iter().copied()))
    }

    pub fn std_dev_curve(&self) -> Curve {
        Curve::from_points(self.grid.iter().copied().zip(self.std_dev.iter().copied()))
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }
}

/// Re-grids every run onto the union of all x values, then summarizes each grid point.
#[instrument(skip_all, name = "aggregation_task", fields(runs = set.len()))]
pub fn run(set: &CurveSet) -> Result<AggregatedCurve, AnalysisError> {
    if set.is_empty() {
        return Err(AnalysisError::invalid("cannot aggregate an empty curve set"));
    }

    let grid = set.common_grid();
    let aligned = set.regridded(&grid)?;
    let columns: Vec<&[f64]> = aligned.iter().map(|(_, curve)| curve.y()).collect();

    let mut mean = Vec::with_capacity(grid.len());
    let mut std_dev = Vec::with_capacity(grid.len());
    let mut samples = Vec::with_capacity(columns.len());
    for i in 0..grid.len() {
        samples.clear();
        samples.extend(columns.iter().map(|col| col[i]));
        // `samples` is never empty here, so both moments exist.
        mean.push(statistics::mean(&samples).unwrap_or(f64::NAN));
        std_dev.push(statistics::population_std_dev(&samples).unwrap_or(f64::NAN));
    }

    info!(grid_points = grid.len(), "Aggregated runs onto common grid.");
    Ok(AggregatedCurve {
        grid,
        mean,
        std_dev,
        runs: set.len(),
    })
}

/// Summarizes all points of all runs grouped by identical x, without interpolation.
pub fn summarize_points(set: &CurveSet) -> Vec<PointSummary> {
    statistics::summarize_by_x(set.iter().flat_map(|(_, curve)| curve.points()))
}
