use crate::core::math::statistics::PointSummary;
use crate::core::models::curve::Curve;
use crate::core::models::curve_set::CurveSet;
use crate::engine::config::{LineScale, ReferenceConfig};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks::aggregation::{self, AggregatedCurve};
use crate::engine::tasks::reference_lines;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleSummary {
    pub aggregated: AggregatedCurve,
    /// Line of the configured slope through the midpoint of the mean curve.
    pub reference_line: Option<Curve>,
    /// Power-law fit (log-log scale) or straight-line fit (linear scale) of the mean curve.
    pub regression_line: Option<Curve>,
    pub point_summary: Vec<PointSummary>,
}

/// Aggregates per-run `(N, τ₀)` curves and derives the comparison lines.
#[instrument(skip_all, name = "ensemble_workflow", fields(runs = runs.len()))]
pub fn run(
    runs: &CurveSet,
    reference: &ReferenceConfig,
    reporter: &ProgressReporter,
) -> Result<EnsembleSummary, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Aggregation",
    });
    let aggregated = aggregation::run(runs)?;
    let point_summary = aggregation::summarize_points(runs);
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart {
        name: "Reference lines",
    });
    let mean_curve = aggregated.mean_curve();
    let reference_line =
        reference_lines::slope_line(&mean_curve, reference.slope, reference.scale);
    if reference_line.is_none() {
        warn!(scale = %reference.scale, "No usable points for the reference line.");
    }

    let regression = match reference.scale {
        LineScale::LogLog => reference_lines::power_law_regression_line(&mean_curve),
        LineScale::Linear => reference_lines::linear_regression_line(&mean_curve),
    };
    let regression_line = match regression {
        Ok(line) => Some(line),
        Err(e) => {
            warn!(error = %e, "Regression line skipped.");
            None
        }
    };
    reporter.report(Progress::PhaseFinish);

    info!(
        runs = aggregated.runs,
        grid_points = aggregated.len(),
        "Ensemble summary complete."
    );
    Ok(EnsembleSummary {
        aggregated,
        reference_line,
        regression_line,
        point_summary,
    })
}
