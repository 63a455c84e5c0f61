//! # Engine Module
//!
//! Configuration, error handling, progress reporting and the computational tasks of the
//! relaxation analysis.
//!
//! - **Configuration** ([`config`]) - typed settings for autocorrelation, fitting, reference
//!   lines and equilibration checks, assembled through [`config::AnalysisConfigBuilder`]
//! - **Error Handling** ([`error`]) - the engine-level error wrapping computation, I/O and
//!   configuration failures
//! - **Progress Monitoring** ([`progress`]) - callback-based progress events
//! - **Tasks** ([`tasks`]) - autocorrelation, exponential fitting, aggregation, reference
//!   lines and equilibration

pub mod config;
pub mod error;
pub mod progress;
pub mod tasks;
