use crate::core::error::AnalysisError;
use crate::core::math::statistics::{block_means, mean};
use crate::engine::config::EquilibrationConfig;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct EquilibrationReport {
    pub global_mean: f64,
    pub block_means: Vec<f64>,
    pub equilibrated: bool,
}

/// Block-averaging check: the series counts as equilibrated when every block mean lies
/// within `relative_tolerance · |global mean|` of the global mean.
pub fn check(
    values: &[f64],
    config: &EquilibrationConfig,
) -> Result<EquilibrationReport, AnalysisError> {
    let blocks = block_means(values, config.blocks)?;
    let global_mean =
        mean(values).ok_or_else(|| AnalysisError::invalid("equilibration check needs samples"))?;
    let limit = global_mean.abs() * config.relative_tolerance;

    for (i, block) in blocks.iter().enumerate() {
        debug!(block = i + 1, mean = block, "Block average.");
    }
    let equilibrated = blocks.iter().all(|b| (b - global_mean).abs() < limit);

    Ok(EquilibrationReport {
        global_mean,
        block_means: blocks,
        equilibrated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stationary_series_is_equilibrated() {
        let values: Vec<f64> = (0..100)
            .map(|i| if i % 2 == 0 { 10.5 } else { 9.5 })
            .collect();
        let report = check(&values, &EquilibrationConfig::default()).unwrap();
        assert!(report.equilibrated);
        assert_eq!(report.block_means.len(), 5);
        assert!((report.global_mean - 10.0).abs() < 1e-12);
    }

    #[test]
    fn drifting_series_is_not_equilibrated() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let report = check(&values, &EquilibrationConfig::default()).unwrap();
        assert!(!report.equilibrated);
    }

    #[test]
    fn too_short_series_is_invalid() {
        assert!(matches!(
            check(&[1.0, 2.0], &EquilibrationConfig::default()),
            Err(AnalysisError::InvalidInput(_))
        ));
    }
}
