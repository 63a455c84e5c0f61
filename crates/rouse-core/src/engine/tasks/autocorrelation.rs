use crate::core::error::AnalysisError;
use crate::core::models::curve::LagCurve;
use crate::core::models::series::{TimeSeries, Vec3};
use crate::engine::config::{AutocorrelationConfig, NormalizationMode};
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Autocorrelation of `series` with the serial or parallel kernel, as configured.
#[instrument(skip_all, name = "autocorrelation_task", fields(samples = series.len()))]
pub fn run(
    series: &TimeSeries,
    config: &AutocorrelationConfig,
    reporter: &ProgressReporter,
) -> Result<LagCurve, AnalysisError> {
    info!(
        max_lag = config.max_lag,
        normalization = %config.normalization,
        parallel = config.parallel,
        "Computing autocorrelation."
    );
    reporter.report(Progress::TaskStart { total_steps: 1 });

    let curve = match series {
        TimeSeries::Scalar(values) => scalar(values, config),
        TimeSeries::Vector(values) if config.parallel => vector_parallel(values, config),
        TimeSeries::Vector(values) => vector(values, config),
    }?;

    reporter.report(Progress::TaskIncrement);
    reporter.report(Progress::TaskFinish);
    debug!(kept_lags = curve.len(), "Autocorrelation band-filtered.");
    Ok(curve)
}

fn validate<T>(samples: &[T], finite: impl Fn(&T) -> bool) -> Result<(), AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::invalid("time series is empty"));
    }
    if samples.len() < 2 {
        return Err(AnalysisError::invalid(
            "autocorrelation needs at least two samples",
        ));
    }
    if !samples.iter().all(finite) {
        return Err(AnalysisError::invalid("time series contains non-finite samples"));
    }
    Ok(())
}

/// Evaluates `f` for every lag in `0..count`, in lag order.
fn evaluate_lags<F>(count: usize, parallel: bool, f: F) -> Vec<f64>
where
    F: Fn(usize) -> f64 + Sync + Send,
{
    #[cfg(feature = "parallel")]
    if parallel {
        return (0..count).into_par_iter().map(f).collect();
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    (0..count).map(f).collect()
}

/// Mean-centered scalar autocorrelation normalized by the sample variance.
///
/// `C(t) = Σ cᵢ·cᵢ₊ₜ / (n − t)` for `t < min(max_lag, n)`. A constant series has zero
/// variance and is returned unnormalized.
pub fn scalar(series: &[f64], config: &AutocorrelationConfig) -> Result<LagCurve, AnalysisError> {
    validate(series, |v| v.is_finite())?;

    let n = series.len();
    let mean = series.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = series.iter().map(|v| v - mean).collect();
    let variance = centered.iter().map(|c| c * c).sum::<f64>() / (n - 1) as f64;
    let scale = if variance > 0.0 { variance } else { 1.0 };

    let values = evaluate_lags(config.max_lag.min(n), config.parallel, |t| {
        let sum: f64 = centered[..n - t]
            .iter()
            .zip(&centered[t..])
            .map(|(a, b)| a * b)
            .sum();
        sum / (n - t) as f64 / scale
    });

    Ok(LagCurve::from_band_filtered(
        values,
        config.band.min,
        config.band.max,
    ))
}

struct VectorKernel {
    samples: Vec<Vec3>,
    scale: f64,
}

impl VectorKernel {
    fn prepare(series: &[Vec3], mode: NormalizationMode) -> Result<Self, AnalysisError> {
        validate(series, |v| v.iter().all(|c| c.is_finite()))?;
        let n = series.len();

        match mode {
            NormalizationMode::Raw => Ok(Self {
                samples: series.to_vec(),
                scale: 1.0,
            }),
            NormalizationMode::Variance => {
                let mean = series.iter().sum::<Vec3>() / n as f64;
                let samples: Vec<Vec3> = series.iter().map(|v| v - mean).collect();
                let variance =
                    samples.iter().map(|d| d.norm_squared()).sum::<f64>() / (n - 1) as f64;
                Ok(Self {
                    samples,
                    scale: if variance > 0.0 { variance } else { 1.0 },
                })
            }
            NormalizationMode::LagZero => {
                let lag_zero = series.iter().map(|v| v.dot(v)).sum::<f64>() / n as f64;
                if lag_zero == 0.0 {
                    return Err(AnalysisError::degenerate(
                        "autocorrelation at lag 0 is zero, cannot normalize",
                    ));
                }
                Ok(Self {
                    samples: series.to_vec(),
                    scale: lag_zero,
                })
            }
        }
    }

    fn lag_count(&self, max_lag: usize) -> usize {
        max_lag.min(self.samples.len())
    }

    fn finish(&self, t: usize, dot_sum: f64) -> f64 {
        dot_sum / (self.samples.len() - t) as f64 / self.scale
    }
}

/// 3-vector autocorrelation computed lag by lag.
pub fn vector(series: &[Vec3], config: &AutocorrelationConfig) -> Result<LagCurve, AnalysisError> {
    let kernel = VectorKernel::prepare(series, config.normalization)?;
    let n = kernel.samples.len();

    let values: Vec<f64> = (0..kernel.lag_count(config.max_lag))
        .map(|t| {
            let sum: f64 = kernel.samples[..n - t]
                .iter()
                .zip(&kernel.samples[t..])
                .map(|(a, b)| a.dot(b))
                .sum();
            kernel.finish(t, sum)
        })
        .collect();

    Ok(LagCurve::from_band_filtered(
        values,
        config.band.min,
        config.band.max,
    ))
}

/// Row `t` holds `vᵢ·vᵢ₊ₜ` for every valid `i`, for `t` below the lag cap only.
///
/// Memory grows as `n · lags`, so callers with very long series should lower `max_lag`.
fn banded_dot_products(samples: &[Vec3], lags: usize) -> Vec<Vec<f64>> {
    let n = samples.len();
    let row = |t: usize| -> Vec<f64> {
        samples[..n - t]
            .iter()
            .zip(&samples[t..])
            .map(|(a, b)| a.dot(b))
            .collect()
    };

    #[cfg(feature = "parallel")]
    let rows = (0..lags).into_par_iter().map(row).collect();
    #[cfg(not(feature = "parallel"))]
    let rows = (0..lags).map(row).collect();

    rows
}

/// 3-vector autocorrelation over a precomputed dot-product band, with each lag evaluated
/// independently into its own slot. Agrees with [`vector`] to rounding.
pub fn vector_parallel(
    series: &[Vec3],
    config: &AutocorrelationConfig,
) -> Result<LagCurve, AnalysisError> {
    let kernel = VectorKernel::prepare(series, config.normalization)?;
    let lags = kernel.lag_count(config.max_lag);
    let table = banded_dot_products(&kernel.samples, lags);

    let values = evaluate_lags(lags, true, |t| {
        let sum: f64 = table[t].iter().sum();
        kernel.finish(t, sum)
    });

    Ok(LagCurve::from_band_filtered(
        values,
        config.band.min,
        config.band.max,
    ))
}
