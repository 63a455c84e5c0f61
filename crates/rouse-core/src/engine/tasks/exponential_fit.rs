//! Single-exponential decay fits `y(lag) = A · exp(b · lag)`.
//!
//! Two strategies share one result type:
//!
//! - **Levenberg-Marquardt** minimizes the squared residuals directly from a fixed initial
//!   guess.
//! - **Log-linear** regresses `ln(y)` on the lag, shifting the data first when it contains
//!   non-positive values.
//!
//! The relaxation time is `τ₀ = −1/b`. It is only reported for a converged fit with a
//! decaying (`b < 0`) solution.

use crate::core::error::AnalysisError;
use crate::core::math::regression::polyfit;
use crate::core::models::curve::{Curve, LagCurve};
use crate::engine::config::{FitConfig, FitStrategy};
use nalgebra::{Matrix2, Vector2};
use tracing::{debug, instrument, warn};

const MAX_DAMPING: f64 = 1e16;
const MIN_DAMPING: f64 = 1e-15;

#[derive(Debug, Clone, PartialEq)]
pub enum FitStatus {
    Converged,
    NotConverged { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub strategy: FitStrategy,
    /// Reported amplitude A₀; `exp(A)` when the fit ran on `ln(y)`.
    pub amplitude: f64,
    /// Model amplitude in the space the data was fitted in.
    pub model_amplitude: f64,
    pub rate: f64,
    pub relaxation_time: Option<f64>,
    pub status: FitStatus,
    pub iterations: usize,
    pub residual_sum_of_squares: f64,
    pub log_y: bool,
}

impl FitResult {
    fn new(
        strategy: FitStrategy,
        amplitude: f64,
        rate: f64,
        status: FitStatus,
        iterations: usize,
        residual_sum_of_squares: f64,
    ) -> Self {
        let relaxation_time = match status {
            FitStatus::Converged if rate < 0.0 && rate.is_finite() => Some(-1.0 / rate),
            _ => None,
        };
        Self {
            strategy,
            amplitude,
            model_amplitude: amplitude,
            rate,
            relaxation_time,
            status,
            iterations,
            residual_sum_of_squares,
            log_y: false,
        }
    }

    pub fn is_converged(&self) -> bool {
        self.status == FitStatus::Converged
    }

    /// A fit is usable downstream only when it yielded a relaxation time.
    pub fn is_success(&self) -> bool {
        self.relaxation_time.is_some()
    }

    /// Model value at `lag`, in the space the data was fitted in.
    pub fn evaluate(&self, lag: f64) -> f64 {
        self.model_amplitude * (self.rate * lag).exp()
    }

    /// The fitted decay evaluated at every lag of `lags`.
    pub fn decay_curve(&self, lags: &LagCurve) -> Curve {
        Curve::from_points(
            lags.lags()
                .iter()
                .map(|&lag| (lag as f64, self.evaluate(lag as f64))),
        )
    }
}

fn validate(x: &[f64], y: &[f64]) -> Result<(), AnalysisError> {
    if x.len() != y.len() {
        return Err(AnalysisError::invalid(format!(
            "fit needs paired samples, got {} lags and {} values",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(AnalysisError::invalid(format!(
            "fit needs at least 2 points, got {}",
            x.len()
        )));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(AnalysisError::invalid("fit samples must be finite"));
    }
    Ok(())
}

/// Fits the lag curve with the configured strategy.
#[instrument(
    skip_all,
    name = "exponential_fit_task",
    fields(strategy = %config.strategy, points = curve.len())
)]
pub fn run(curve: &LagCurve, config: &FitConfig) -> Result<FitResult, AnalysisError> {
    let x = curve.lags_as_f64();

    let result = match config.strategy {
        FitStrategy::LevenbergMarquardt if config.log_y => {
            let log_values = to_log(curve.values())?;
            let mut result = levenberg_marquardt(&x, &log_values, config)?;
            result.amplitude = result.model_amplitude.exp();
            result.log_y = true;
            result
        }
        FitStrategy::LevenbergMarquardt => levenberg_marquardt(&x, curve.values(), config)?,
        FitStrategy::LogLinear => {
            if config.log_y {
                debug!("Log-y conversion does not apply to the log-linear strategy; ignoring.");
            }
            log_linear(&x, curve.values(), config.polynomial_degree)?
        }
    };

    match (&result.status, result.relaxation_time) {
        (FitStatus::Converged, Some(tau)) => debug!(
            amplitude = result.amplitude,
            tau0 = tau,
            iterations = result.iterations,
            "Fit converged."
        ),
        (FitStatus::Converged, None) => {
            warn!(rate = result.rate, "Fit converged to a non-decaying solution.")
        }
        (FitStatus::NotConverged { reason }, _) => warn!(%reason, "Fit did not converge."),
    }
    Ok(result)
}

fn to_log(values: &[f64]) -> Result<Vec<f64>, AnalysisError> {
    values
        .iter()
        .map(|&v| {
            if v > 0.0 {
                Ok(v.ln())
            } else {
                Err(AnalysisError::invalid(format!(
                    "cannot take the logarithm of non-positive value {}",
                    v
                )))
            }
        })
        .collect()
}

fn sum_of_squares(x: &[f64], y: &[f64], a: f64, b: f64) -> f64 {
    x.iter()
        .zip(y)
        .map(|(&xi, &yi)| (yi - a * (b * xi).exp()).powi(2))
        .sum()
}

/// Regresses `ln(y + offset)` on the lag with a polynomial of `degree`; the linear
/// coefficient is the decay rate.
///
/// No offset is applied when every value is positive. Otherwise the offset is
/// `max(0, 1 − min positive y)`.
pub fn log_linear(x: &[f64], y: &[f64], degree: usize) -> Result<FitResult, AnalysisError> {
    validate(x, y)?;

    let offset = if y.iter().all(|&v| v > 0.0) {
        0.0
    } else {
        let min_positive = y
            .iter()
            .copied()
            .filter(|&v| v > 0.0)
            .min_by(f64::total_cmp)
            .ok_or_else(|| {
                AnalysisError::invalid("log-linear fit needs at least one positive value")
            })?;
        (1.0 - min_positive).max(0.0)
    };

    let shifted: Vec<f64> = y.iter().map(|v| v + offset).collect();
    if let Some(bad) = shifted.iter().find(|&&v| v <= 0.0) {
        return Err(AnalysisError::invalid(format!(
            "value {} is still non-positive after shifting by {}",
            bad - offset,
            offset
        )));
    }
    let log_y: Vec<f64> = shifted.iter().map(|v| v.ln()).collect();

    let coeffs = polyfit(x, &log_y, degree.max(1))?;
    let amplitude = coeffs[0].exp() - offset;
    let rate = coeffs[1];

    Ok(FitResult::new(
        FitStrategy::LogLinear,
        amplitude,
        rate,
        FitStatus::Converged,
        1,
        sum_of_squares(x, y, amplitude, rate),
    ))
}

/// Damped Gauss-Newton iteration on `(A, b)`.
///
/// Stops with [`FitStatus::Converged`] when the gradient, the step or the residual sum of
/// squares falls below its tolerance; reports [`FitStatus::NotConverged`] when the iteration
/// cap is reached or no damping level reduces the error.
pub fn levenberg_marquardt(
    x: &[f64],
    y: &[f64],
    config: &FitConfig,
) -> Result<FitResult, AnalysisError> {
    validate(x, y)?;
    let tol = &config.tolerances;

    let mut params = Vector2::new(config.initial_amplitude, config.initial_rate);
    let mut sse = sum_of_squares(x, y, params[0], params[1]);
    if !sse.is_finite() {
        return Err(AnalysisError::invalid(
            "initial guess produces a non-finite residual",
        ));
    }
    let mut lambda = 1e-3;
    let finish = |params: Vector2<f64>, status, iterations, sse| {
        FitResult::new(
            FitStrategy::LevenbergMarquardt,
            params[0],
            params[1],
            status,
            iterations,
            sse,
        )
    };

    for iteration in 1..=config.max_iterations {
        if sse <= tol.function {
            return Ok(finish(params, FitStatus::Converged, iteration - 1, sse));
        }

        let (jtj, jtr) = normal_equations(x, y, params[0], params[1]);
        if jtr.amax() <= tol.gradient {
            return Ok(finish(params, FitStatus::Converged, iteration - 1, sse));
        }

        loop {
            let mut damped = jtj;
            for i in 0..2 {
                damped[(i, i)] += lambda * jtj[(i, i)].max(MIN_DAMPING);
            }

            let Some(step) = damped.lu().solve(&jtr) else {
                lambda *= 10.0;
                if lambda > MAX_DAMPING {
                    return Ok(finish(params, damping_overflow(), iteration, sse));
                }
                continue;
            };

            if step.norm() <= tol.step * (params.norm() + tol.step) {
                return Ok(finish(params, FitStatus::Converged, iteration, sse));
            }

            let candidate = params + step;
            let candidate_sse = sum_of_squares(x, y, candidate[0], candidate[1]);
            if candidate_sse.is_finite() && candidate_sse < sse {
                params = candidate;
                sse = candidate_sse;
                lambda = (lambda / 10.0).max(MIN_DAMPING);
                break;
            }

            lambda *= 10.0;
            if lambda > MAX_DAMPING {
                return Ok(finish(params, damping_overflow(), iteration, sse));
            }
        }
    }

    Ok(finish(
        params,
        FitStatus::NotConverged {
            reason: format!("iteration cap of {} reached", config.max_iterations),
        },
        config.max_iterations,
        sse,
    ))
}

fn damping_overflow() -> FitStatus {
    FitStatus::NotConverged {
        reason: "damping exceeded its limit without reducing the error".to_string(),
    }
}

/// `JᵀJ` and `Jᵀr` for the model `a · exp(b x)` with residuals `r = y − model`.
fn normal_equations(x: &[f64], y: &[f64], a: f64, b: f64) -> (Matrix2<f64>, Vector2<f64>) {
    let mut jtj = Matrix2::zeros();
    let mut jtr = Vector2::zeros();
    for (&xi, &yi) in x.iter().zip(y) {
        let e = (b * xi).exp();
        let j = Vector2::new(e, a * xi * e);
        let r = yi - a * e;
        jtj += j * j.transpose();
        jtr += j * r;
    }
    (jtj, jtr)
}
