use crate::core::error::AnalysisError;

/// Piecewise-linear interpolant over arbitrary sample points.
///
/// Samples are sorted by x on construction. Queries at or below the smallest x return the
/// first y unchanged; queries above the largest x extend the last segment linearly.
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl LinearInterpolator {
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self, AnalysisError> {
        if x.len() != y.len() {
            return Err(AnalysisError::invalid(format!(
                "interpolator needs paired samples, got {} x and {} y",
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(AnalysisError::invalid("interpolator needs at least one sample"));
        }
        if x.iter().chain(y).any(|v| !v.is_finite()) {
            return Err(AnalysisError::invalid("interpolator samples must be finite"));
        }

        let mut pairs: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (xs, ys) = pairs.into_iter().unzip();

        Ok(Self { xs, ys })
    }

    pub fn interpolate(&self, x: f64) -> f64 {
        let n = self.xs.len();
        if n == 1 || x <= self.xs[0] {
            return self.ys[0];
        }

        // First sample with x_i >= x; clamped so queries past the end reuse the last segment.
        let upper = self.xs.partition_point(|&xi| xi < x).min(n - 1);
        let lower = upper - 1;

        let (x0, x1) = (self.xs[lower], self.xs[upper]);
        let (y0, y1) = (self.ys[lower], self.ys[upper]);
        if x == x1 || x1 == x0 {
            return y1;
        }
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }

    pub fn interpolate_all(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.interpolate(x)).collect()
    }

    pub fn min_x(&self) -> f64 {
        self.xs[0]
    }

    pub fn max_x(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }
}
