use super::config::ConfigError;
use crate::core::error::AnalysisError;
use crate::core::io::ColumnFileError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Analysis failed: {source}")]
    Analysis {
        #[from]
        source: AnalysisError,
    },

    #[error("Data file error: {source}")]
    DataFile {
        #[from]
        source: ColumnFileError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Phase '{phase}' failed: {reason}")]
    PhaseFailed { phase: &'static str, reason: String },
}
