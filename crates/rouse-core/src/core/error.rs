use thiserror::Error;

/// Failure modes of the numerical routines.
///
/// Solver non-convergence is not an error; it is reported through
/// [`FitStatus`](crate::engine::tasks::exponential_fit::FitStatus) on an otherwise valid result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

impl AnalysisError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub(crate) fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateInput(message.into())
    }
}
