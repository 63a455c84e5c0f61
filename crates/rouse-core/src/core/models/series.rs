use super::kind::DataKind;
use nalgebra::Vector3;

pub type Vec3 = Vector3<f64>;

/// Ordered samples of one observable from a single simulation run.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeSeries {
    Scalar(Vec<f64>),
    Vector(Vec<Vec3>),
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        match self {
            TimeSeries::Scalar(values) => values.len(),
            TimeSeries::Vector(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> DataKind {
        match self {
            TimeSeries::Scalar(_) => DataKind::R2,
            TimeSeries::Vector(_) => DataKind::EndToEndVector,
        }
    }

    /// Scalar view used by block-averaging checks: the value itself for scalar series,
    /// the squared norm for vector series.
    pub fn magnitudes(&self) -> Vec<f64> {
        match self {
            TimeSeries::Scalar(values) => values.clone(),
            TimeSeries::Vector(values) => values.iter().map(|v| v.norm_squared()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_magnitudes_are_squared_norms() {
        let series = TimeSeries::Vector(vec![Vec3::new(1.0, 2.0, 2.0), Vec3::zeros()]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.kind(), DataKind::EndToEndVector);
        assert_eq!(series.magnitudes(), vec![9.0, 0.0]);
    }

    #[test]
    fn empty_scalar_series() {
        let series = TimeSeries::Scalar(Vec::new());
        assert!(series.is_empty());
        assert_eq!(series.kind(), DataKind::R2);
    }
}
