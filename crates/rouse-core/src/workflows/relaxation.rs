use crate::core::io::columns::read_time_series;
use crate::core::models::curve::{Curve, LagCurve};
use crate::core::models::series::TimeSeries;
use crate::engine::config::AnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks::autocorrelation;
use crate::engine::tasks::equilibration::{self, EquilibrationReport};
use crate::engine::tasks::exponential_fit::{self, FitResult};
use std::path::Path;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct RelaxationAnalysis {
    pub lag_curve: LagCurve,
    pub fit: FitResult,
    /// The fitted model evaluated on the lag support of `lag_curve`.
    pub decay_curve: Curve,
    pub equilibration: Option<EquilibrationReport>,
}

impl RelaxationAnalysis {
    pub fn relaxation_time(&self) -> Option<f64> {
        self.fit.relaxation_time
    }
}

#[instrument(skip_all, name = "relaxation_workflow", fields(samples = series.len()))]
pub fn run(
    series: &TimeSeries,
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<RelaxationAnalysis, EngineError> {
    let equilibration = match &config.equilibration {
        Some(eq_config) if series.len() < eq_config.blocks => {
            warn!(
                samples = series.len(),
                blocks = eq_config.blocks,
                "Series too short for block averaging; equilibration check skipped."
            );
            None
        }
        Some(eq_config) => {
            reporter.report(Progress::PhaseStart {
                name: "Equilibration check",
            });
            let report = equilibration::check(&series.magnitudes(), eq_config)?;
            if !report.equilibrated {
                warn!(
                    global_mean = report.global_mean,
                    "Block averages deviate from the global mean; series may not be equilibrated."
                );
            }
            reporter.report(Progress::PhaseFinish);
            Some(report)
        }
        None => None,
    };

    reporter.report(Progress::PhaseStart {
        name: "Autocorrelation",
    });
    let lag_curve = autocorrelation::run(series, &config.autocorrelation, reporter)?;
    reporter.report(Progress::PhaseFinish);

    if lag_curve.len() < 2 {
        return Err(EngineError::PhaseFailed {
            phase: "Autocorrelation",
            reason: format!(
                "only {} value(s) inside the threshold band [{}, {}]",
                lag_curve.len(),
                config.autocorrelation.band.min,
                config.autocorrelation.band.max
            ),
        });
    }

    reporter.report(Progress::PhaseStart {
        name: "Exponential fit",
    });
    let fit = exponential_fit::run(&lag_curve, &config.fit)?;
    let decay_curve = fit.decay_curve(&lag_curve);
    reporter.report(Progress::PhaseFinish);

    info!(
        lags = lag_curve.len(),
        amplitude = fit.amplitude,
        tau0 = ?fit.relaxation_time,
        "Relaxation analysis complete."
    );

    Ok(RelaxationAnalysis {
        lag_curve,
        fit,
        decay_curve,
        equilibration,
    })
}

/// Reads the observable configured in `config.data_kind` from `path` and analyzes it.
pub fn run_file(
    path: &Path,
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<RelaxationAnalysis, EngineError> {
    info!(path = %path.display(), kind = %config.data_kind, "Loading time series.");
    let series = read_time_series(path, config.data_kind)?;
    run(&series, config, reporter)
}
