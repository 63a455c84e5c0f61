use crate::core::models::kind::DataKind;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

macro_rules! kebab_enum {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($name => Ok($ty::$variant),)+
                    _ => Err(format!(
                        "unknown {} '{}' (expected one of: {})",
                        stringify!($ty),
                        s,
                        [$($name),+].join(", ")
                    )),
                }
            }
        }
    };
}

/// Normalization applied to 3-vector autocorrelation. Scalar series are always divided by
/// their sample variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizationMode {
    /// Uncentered `<v(i)·v(i+t)>` with no normalization.
    Raw,
    /// Centered dot products divided by the sample variance of the squared deviations.
    Variance,
    /// Uncentered dot products divided by their lag-0 value.
    LagZero,
}

kebab_enum!(NormalizationMode {
    Raw => "raw",
    Variance => "variance",
    LagZero => "lag-zero",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitStrategy {
    LevenbergMarquardt,
    LogLinear,
}

kebab_enum!(FitStrategy {
    LevenbergMarquardt => "levenberg-marquardt",
    LogLinear => "log-linear",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineScale {
    Linear,
    LogLog,
}

kebab_enum!(LineScale {
    Linear => "linear",
    LogLog => "log-log",
});

/// Inclusive acceptance band for autocorrelation values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdBand {
    pub min: f64,
    pub max: f64,
}

impl ThresholdBand {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutocorrelationConfig {
    pub max_lag: usize,
    pub band: ThresholdBand,
    pub normalization: NormalizationMode,
    pub parallel: bool,
}

impl Default for AutocorrelationConfig {
    fn default() -> Self {
        Self {
            max_lag: 1000,
            band: ThresholdBand {
                min: 1e-5,
                max: 0.9999,
            },
            normalization: NormalizationMode::LagZero,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverTolerances {
    pub gradient: f64,
    pub step: f64,
    pub function: f64,
}

impl Default for SolverTolerances {
    fn default() -> Self {
        Self {
            gradient: 1e-12,
            step: 1e-12,
            function: 1e-20,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitConfig {
    pub strategy: FitStrategy,
    /// Fit `ln(value)` instead of the raw autocorrelation.
    pub log_y: bool,
    pub max_iterations: usize,
    pub initial_amplitude: f64,
    pub initial_rate: f64,
    /// Degree of the polynomial regressed against `ln(y)` by the log-linear strategy.
    pub polynomial_degree: usize,
    pub tolerances: SolverTolerances,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            strategy: FitStrategy::LevenbergMarquardt,
            log_y: false,
            max_iterations: 10_000,
            initial_amplitude: 1.0,
            initial_rate: -0.1,
            polynomial_degree: 1,
            tolerances: SolverTolerances::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceConfig {
    pub slope: f64,
    pub scale: LineScale,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            slope: 2.0,
            scale: LineScale::LogLog,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquilibrationConfig {
    pub blocks: usize,
    /// Largest accepted deviation of a block mean, relative to the global mean.
    pub relative_tolerance: f64,
}

impl Default for EquilibrationConfig {
    fn default() -> Self {
        Self {
            blocks: 5,
            relative_tolerance: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub data_kind: DataKind,
    pub autocorrelation: AutocorrelationConfig,
    pub fit: FitConfig,
    pub reference: ReferenceConfig,
    pub equilibration: Option<EquilibrationConfig>,
}

#[derive(Default)]
pub struct AnalysisConfigBuilder {
    data_kind: Option<DataKind>,
    max_lag: Option<usize>,
    min_threshold: Option<f64>,
    max_threshold: Option<f64>,
    normalization: Option<NormalizationMode>,
    parallel: Option<bool>,
    fit_strategy: Option<FitStrategy>,
    log_y: Option<bool>,
    max_iterations: Option<usize>,
    initial_amplitude: Option<f64>,
    initial_rate: Option<f64>,
    polynomial_degree: Option<usize>,
    reference_slope: Option<f64>,
    reference_scale: Option<LineScale>,
    equilibration: Option<EquilibrationConfig>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data_kind(mut self, kind: DataKind) -> Self {
        self.data_kind = Some(kind);
        self
    }
    pub fn max_lag(mut self, lags: usize) -> Self {
        self.max_lag = Some(lags);
        self
    }
    pub fn min_threshold(mut self, threshold: f64) -> Self {
        self.min_threshold = Some(threshold);
        self
    }
    pub fn max_threshold(mut self, threshold: f64) -> Self {
        self.max_threshold = Some(threshold);
        self
    }
    pub fn normalization(mut self, mode: NormalizationMode) -> Self {
        self.normalization = Some(mode);
        self
    }
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = Some(enabled);
        self
    }
    pub fn fit_strategy(mut self, strategy: FitStrategy) -> Self {
        self.fit_strategy = Some(strategy);
        self
    }
    pub fn log_y(mut self, enabled: bool) -> Self {
        self.log_y = Some(enabled);
        self
    }
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }
    pub fn initial_guess(mut self, amplitude: f64, rate: f64) -> Self {
        self.initial_amplitude = Some(amplitude);
        self.initial_rate = Some(rate);
        self
    }
    pub fn polynomial_degree(mut self, degree: usize) -> Self {
        self.polynomial_degree = Some(degree);
        self
    }
    pub fn reference_slope(mut self, slope: f64) -> Self {
        self.reference_slope = Some(slope);
        self
    }
    pub fn reference_scale(mut self, scale: LineScale) -> Self {
        self.reference_scale = Some(scale);
        self
    }
    pub fn equilibration(mut self, config: Option<EquilibrationConfig>) -> Self {
        self.equilibration = config;
        self
    }

    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let fit_defaults = FitConfig::default();

        let max_lag = self
            .max_lag
            .ok_or(ConfigError::MissingParameter("max_lag"))?;
        if max_lag == 0 {
            return Err(invalid("max_lag", "must be at least 1"));
        }
        let band = ThresholdBand {
            min: self
                .min_threshold
                .ok_or(ConfigError::MissingParameter("min_threshold"))?,
            max: self
                .max_threshold
                .ok_or(ConfigError::MissingParameter("max_threshold"))?,
        };
        if !(band.min.is_finite() && band.max.is_finite()) || band.min > band.max {
            return Err(invalid(
                "threshold",
                format!("band [{}, {}] is empty or not finite", band.min, band.max),
            ));
        }
        let autocorrelation = AutocorrelationConfig {
            max_lag,
            band,
            normalization: self
                .normalization
                .ok_or(ConfigError::MissingParameter("normalization"))?,
            parallel: self.parallel.unwrap_or(true),
        };

        let fit = FitConfig {
            strategy: self
                .fit_strategy
                .ok_or(ConfigError::MissingParameter("fit_strategy"))?,
            log_y: self.log_y.unwrap_or(false),
            max_iterations: self.max_iterations.unwrap_or(fit_defaults.max_iterations),
            initial_amplitude: self
                .initial_amplitude
                .unwrap_or(fit_defaults.initial_amplitude),
            initial_rate: self.initial_rate.unwrap_or(fit_defaults.initial_rate),
            polynomial_degree: self
                .polynomial_degree
                .unwrap_or(fit_defaults.polynomial_degree),
            tolerances: fit_defaults.tolerances,
        };
        if fit.max_iterations == 0 {
            return Err(invalid("max_iterations", "must be at least 1"));
        }
        if fit.polynomial_degree == 0 {
            return Err(invalid("polynomial_degree", "must be at least 1"));
        }

        let reference = ReferenceConfig {
            slope: self
                .reference_slope
                .ok_or(ConfigError::MissingParameter("reference_slope"))?,
            scale: self.reference_scale.unwrap_or(LineScale::LogLog),
        };
        if !reference.slope.is_finite() {
            return Err(invalid("reference_slope", "must be finite"));
        }

        if let Some(eq) = &self.equilibration {
            if eq.blocks == 0 {
                return Err(invalid("equilibration.blocks", "must be at least 1"));
            }
            if eq.relative_tolerance.is_nan() || eq.relative_tolerance <= 0.0 {
                return Err(invalid("equilibration.relative_tolerance", "must be positive"));
            }
        }

        Ok(AnalysisConfig {
            data_kind: self
                .data_kind
                .ok_or(ConfigError::MissingParameter("data_kind"))?,
            autocorrelation,
            fit,
            reference,
            equilibration: self.equilibration,
        })
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}
