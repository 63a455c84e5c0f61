use crate::core::error::AnalysisError;

/// Paired x/y samples of equal length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Curve {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Curve {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, AnalysisError> {
        if x.len() != y.len() {
            return Err(AnalysisError::invalid(format!(
                "curve has {} x values but {} y values",
                x.len(),
                y.len()
            )));
        }
        Ok(Self { x, y })
    }

    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let (x, y) = points.into_iter().unzip();
        Self { x, y }
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.x, self.y)
    }

    /// Keeps the first `len` points. Lengths at or above the current length leave the curve
    /// untouched.
    pub fn truncate(&mut self, len: usize) -> Result<(), AnalysisError> {
        if len >= self.len() {
            return Ok(());
        }
        self.x.truncate(len);
        self.y.truncate(len);
        if self.x.len() != self.y.len() {
            return Err(AnalysisError::InvariantViolation(format!(
                "truncation left {} x values and {} y values",
                self.x.len(),
                self.y.len()
            )));
        }
        Ok(())
    }
}

/// Autocorrelation values indexed by strictly increasing integer lags.
///
/// Lags need not be contiguous: values outside the configured threshold band are dropped
/// when the curve is built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LagCurve {
    lags: Vec<usize>,
    values: Vec<f64>,
}

impl LagCurve {
    pub fn new(lags: Vec<usize>, values: Vec<f64>) -> Result<Self, AnalysisError> {
        if lags.len() != values.len() {
            return Err(AnalysisError::invalid(format!(
                "lag curve has {} lags but {} values",
                lags.len(),
                values.len()
            )));
        }
        if lags.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AnalysisError::invalid("lags must be strictly increasing"));
        }
        Ok(Self { lags, values })
    }

    /// Builds the curve from lag-ordered values, keeping only those inside `[min, max]`.
    pub(crate) fn from_band_filtered(
        values: impl IntoIterator<Item = f64>,
        min: f64,
        max: f64,
    ) -> Self {
        let (lags, values) = values
            .into_iter()
            .enumerate()
            .filter(|&(_, v)| v >= min && v <= max)
            .unzip();
        Self { lags, values }
    }

    pub fn lags(&self) -> &[usize] {
        &self.lags
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.lags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lags.is_empty()
    }

    pub fn lags_as_f64(&self) -> Vec<f64> {
        self.lags.iter().map(|&lag| lag as f64).collect()
    }

    pub fn to_curve(&self) -> Curve {
        Curve {
            x: self.lags_as_f64(),
            y: self.values.clone(),
        }
    }
}
