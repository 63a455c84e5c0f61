use crate::core::error::AnalysisError;
use crate::core::math::regression::{self, evaluate_polynomial};
use crate::core::models::curve::Curve;
use crate::engine::config::LineScale;

fn midrange(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (min, max) = values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })?;
    Some((min + max) / 2.0)
}

/// Line of the given slope through the midpoint of the curve's x and y ranges, evaluated at
/// the curve's x values.
///
/// In [`LineScale::LogLog`] the line is built in base-10 log space from the pairs with
/// positive x and y, and mapped back; it then reads `y = C · x^slope`. Returns `None` when
/// no usable point remains.
pub fn slope_line(curve: &Curve, slope: f64, scale: LineScale) -> Option<Curve> {
    match scale {
        LineScale::Linear => {
            let mid_x = midrange(curve.x().iter().copied())?;
            let mid_y = midrange(curve.y().iter().copied())?;
            let intercept = mid_y - slope * mid_x;
            Some(Curve::from_points(
                curve.x().iter().map(|&x| (x, slope * x + intercept)),
            ))
        }
        LineScale::LogLog => {
            let logs: Vec<(f64, f64)> = curve
                .points()
                .filter(|&(x, y)| x > 0.0 && y > 0.0)
                .map(|(x, y)| (x.log10(), y.log10()))
                .collect();
            let mid_x = midrange(logs.iter().map(|p| p.0))?;
            let mid_y = midrange(logs.iter().map(|p| p.1))?;
            let intercept = mid_y - slope * mid_x;
            Some(Curve::from_points(logs.iter().map(|&(lx, _)| {
                (10f64.powf(lx), 10f64.powf(slope * lx + intercept))
            })))
        }
    }
}

/// Least-squares straight line evaluated at the curve's x values.
pub fn linear_regression_line(curve: &Curve) -> Result<Curve, AnalysisError> {
    let fit = regression::linear_fit(curve.x(), curve.y())?;
    Ok(Curve::from_points(
        curve.x().iter().map(|&x| (x, fit.evaluate(x))),
    ))
}

/// Power law `y = e^a · x^b` fitted in natural-log space, evaluated at the curve's positive
/// x values.
pub fn power_law_regression_line(curve: &Curve) -> Result<Curve, AnalysisError> {
    let fit = regression::power_law_fit(curve.x(), curve.y())?;
    Ok(Curve::from_points(
        curve
            .x()
            .iter()
            .filter(|&&x| x > 0.0)
            .map(|&x| (x, fit.evaluate(x))),
    ))
}

/// Least-squares polynomial of `order` evaluated at the curve's x values.
pub fn polynomial_smoothing(curve: &Curve, order: usize) -> Result<Curve, AnalysisError> {
    let coeffs = regression::polyfit(curve.x(), curve.y(), order)?;
    Ok(Curve::from_points(
        curve
            .x()
            .iter()
            .map(|&x| (x, evaluate_polynomial(&coeffs, x))),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(x: &[f64], y: &[f64]) -> Curve {
        Curve::new(x.to_vec(), y.to_vec()).unwrap()
    }

    #[test]
    fn linear_line_passes_through_range_midpoint() {
        let data = curve(&[0.0, 4.0, 2.0], &[1.0, 3.0, 10.0]);
        let line = slope_line(&data, 0.5, LineScale::Linear).unwrap();
        // Midpoint (2, 5.5).
        assert_eq!(line.x(), data.x());
        assert!((line.y()[2] - 5.5).abs() < 1e-12);
        assert!((line.y()[1] - 6.5).abs() < 1e-12);
    }

    #[test]
    fn log_log_line_has_requested_exponent() {
        let data = curve(&[1.0, 10.0, 100.0], &[2.0, 50.0, 800.0]);
        let line = slope_line(&data, 2.0, LineScale::LogLog).unwrap();

        let (x, y) = (line.x(), line.y());
        let exponent = (y[2] / y[0]).log10() / (x[2] / x[0]).log10();
        assert!((exponent - 2.0).abs() < 1e-9);
        // Passes through the log-space midpoint (10, 40).
        assert!((y[1] - 40.0).abs() < 1e-9);
    }

    #[test]
    fn log_log_filters_pairs_jointly() {
        let data = curve(&[-1.0, 1.0, 10.0, 100.0], &[5.0, -2.0, 10.0, 1000.0]);
        let line = slope_line(&data, 1.0, LineScale::LogLog).unwrap();
        assert_eq!(line.len(), 2);
        assert!((line.x()[0] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn log_log_without_positive_pairs_is_absent() {
        let data = curve(&[-1.0, 0.0], &[1.0, 1.0]);
        assert_eq!(slope_line(&data, 2.0, LineScale::LogLog), None);
        assert_eq!(slope_line(&Curve::default(), 2.0, LineScale::Linear), None);
    }

    #[test]
    fn regression_lines_track_exact_models() {
        let x = [1.0, 2.0, 4.0, 8.0];
        let power = curve(&x, &x.map(|v| 3.0 * v * v));
        let fitted = power_law_regression_line(&power).unwrap();
        for (a, b) in fitted.y().iter().zip(power.y()) {
            assert!((a - b).abs() < 1e-8);
        }

        let straight = curve(&x, &x.map(|v| 1.0 + 2.0 * v));
        let fitted = linear_regression_line(&straight).unwrap();
        assert!((fitted.y()[3] - 17.0).abs() < 1e-9);
    }

    #[test]
    fn polynomial_smoothing_reproduces_a_parabola() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let data = curve(&x, &x.map(|v| v * v - v));
        let smooth = polynomial_smoothing(&data, 2).unwrap();
        assert!((smooth.y()[4] - 12.0).abs() < 1e-8);
    }
}
