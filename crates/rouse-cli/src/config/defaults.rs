use rouse::core::models::kind::DataKind;
use rouse::engine::config::{FitStrategy, LineScale, NormalizationMode};

pub struct DefaultsConfig {
    pub data_kind: DataKind,
    pub run_pattern: String,
    pub residue_pattern: String,
    pub max_lag: usize,
    pub min_threshold: f64,
    pub max_threshold: f64,
    pub normalization: NormalizationMode,
    pub parallel: bool,
    pub fit_strategy: FitStrategy,
    pub log_y: bool,
    pub max_iterations: usize,
    pub initial_amplitude: f64,
    pub initial_rate: f64,
    pub polynomial_degree: usize,
    pub reference_slope: f64,
    pub reference_scale: LineScale,
    pub equilibration_enabled: bool,
    pub equilibration_blocks: usize,
    pub equilibration_tolerance: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            data_kind: DataKind::EndToEndVector,
            run_pattern: r"^\d{8}_\d{6}$".to_string(),
            residue_pattern: r"run\d+_inner\d+_outer\d+_factor\d+_residue\d+".to_string(),
            max_lag: 1000,
            min_threshold: 1e-5,
            max_threshold: 0.9999,
            normalization: NormalizationMode::LagZero,
            parallel: true,
            fit_strategy: FitStrategy::LevenbergMarquardt,
            log_y: false,
            max_iterations: 10_000,
            initial_amplitude: 1.0,
            initial_rate: -0.1,
            polynomial_degree: 1,
            reference_slope: 2.0,
            reference_scale: LineScale::LogLog,
            equilibration_enabled: true,
            equilibration_blocks: 5,
            equilibration_tolerance: 0.1,
        }
    }
}
