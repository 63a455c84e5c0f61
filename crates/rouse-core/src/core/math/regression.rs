//! Linear least squares on small design matrices.
//!
//! Every fit here reduces to `minimize |X β - y|²` with at most a handful of columns, which
//! is solved through SVD so tall, nearly collinear designs still produce a usable β.

use crate::core::error::AnalysisError;
use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if no tolerance yields a finite solution.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Progressively looser singular-value cutoffs.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fits a polynomial of the given degree; coefficients are returned lowest order first.
///
/// # Errors
///
/// * [`AnalysisError::InvalidInput`] for mismatched lengths, non-finite samples or fewer
///   samples than coefficients.
/// * [`AnalysisError::DegenerateInput`] when the samples have too few distinct x values to
///   determine the coefficients.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Vec<f64>, AnalysisError> {
    if x.len() != y.len() {
        return Err(AnalysisError::invalid(format!(
            "regression needs paired samples, got {} x and {} y",
            x.len(),
            y.len()
        )));
    }
    let n_coeffs = degree + 1;
    if x.len() < n_coeffs.max(2) {
        return Err(AnalysisError::invalid(format!(
            "degree {} regression needs at least {} samples, got {}",
            degree,
            n_coeffs.max(2),
            x.len()
        )));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(AnalysisError::invalid("regression samples must be finite"));
    }

    let mut distinct: Vec<f64> = x.to_vec();
    distinct.sort_by(f64::total_cmp);
    distinct.dedup();
    if distinct.len() < n_coeffs {
        return Err(AnalysisError::degenerate(format!(
            "only {} distinct x values for {} coefficients",
            distinct.len(),
            n_coeffs
        )));
    }

    let design = DMatrix::from_fn(x.len(), n_coeffs, |row, col| x[row].powi(col as i32));
    let target = DVector::from_column_slice(y);

    solve_least_squares(&design, &target)
        .map(|beta| beta.iter().copied().collect())
        .ok_or_else(|| AnalysisError::degenerate("least squares system is singular"))
}

/// Horner evaluation of coefficients stored lowest order first.
pub fn evaluate_polynomial(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LineFit {
    pub fn evaluate(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

pub fn linear_fit(x: &[f64], y: &[f64]) -> Result<LineFit, AnalysisError> {
    let coeffs = polyfit(x, y, 1)?;
    Ok(LineFit {
        intercept: coeffs[0],
        slope: coeffs[1],
    })
}

/// `y = prefactor · x^exponent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLawFit {
    pub prefactor: f64,
    pub exponent: f64,
}

impl PowerLawFit {
    pub fn evaluate(&self, x: f64) -> f64 {
        self.prefactor * x.powf(self.exponent)
    }
}

/// Straight-line fit of `ln y` against `ln x`. Pairs with a non-positive coordinate are
/// skipped.
pub fn power_law_fit(x: &[f64], y: &[f64]) -> Result<PowerLawFit, AnalysisError> {
    if x.len() != y.len() {
        return Err(AnalysisError::invalid(format!(
            "power-law fit needs paired samples, got {} x and {} y",
            x.len(),
            y.len()
        )));
    }
    let (log_x, log_y): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter(|&(&xi, &yi)| xi > 0.0 && yi > 0.0)
        .map(|(&xi, &yi)| (xi.ln(), yi.ln()))
        .unzip();

    let line = linear_fit(&log_x, &log_y)?;
    Ok(PowerLawFit {
        prefactor: line.intercept.exp(),
        exponent: line.slope,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // y = 2 + 3x on x = [0, 1, 2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn quadratic_polyfit_recovers_coefficients() {
        let x: Vec<f64> = (0..10).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|&v| 1.0 - 2.0 * v + 0.5 * v * v).collect();

        let coeffs = polyfit(&x, &y, 2).unwrap();
        assert!((coeffs[0] - 1.0).abs() < 1e-8);
        assert!((coeffs[1] + 2.0).abs() < 1e-8);
        assert!((coeffs[2] - 0.5).abs() < 1e-8);
        assert!((evaluate_polynomial(&coeffs, 4.0) - 1.0).abs() < 1e-8);
    }

    #[test]
    fn polyfit_rejects_too_few_points() {
        assert!(matches!(
            polyfit(&[1.0], &[1.0], 1),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert!(matches!(
            polyfit(&[1.0, 2.0], &[1.0, 2.0, 3.0], 1),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn repeated_x_is_degenerate() {
        assert!(matches!(
            linear_fit(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]),
            Err(AnalysisError::DegenerateInput(_))
        ));
    }

    #[test]
    fn power_law_fit_skips_non_positive_pairs() {
        let x = [-1.0, 1.0, 2.0, 4.0, 8.0];
        let y = [3.0, 3.0, 12.0, 48.0, 192.0];

        let fit = power_law_fit(&x, &y).unwrap();
        assert!((fit.exponent - 2.0).abs() < 1e-9);
        assert!((fit.prefactor - 3.0).abs() < 1e-9);
        assert!((fit.evaluate(3.0) - 27.0).abs() < 1e-8);
    }
}
