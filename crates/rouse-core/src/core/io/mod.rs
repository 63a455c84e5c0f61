//! Plain-text numeric column I/O.
//!
//! Simulation output and analysis results are whitespace-separated columns. Readers skip
//! blank lines, `#` comments and lines that do not parse; writers create parent directories
//! on demand.

pub mod columns;
pub mod writer;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ColumnFileError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("No numeric samples found in '{path}'")]
    NoData { path: String },
}

impl ColumnFileError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
