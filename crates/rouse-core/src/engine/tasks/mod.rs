//! Computational tasks of the relaxation analysis.
//!
//! Each task is a pure function of its inputs and configuration. Workflows chain them and
//! handle progress reporting around the expensive ones.

pub mod aggregation;
pub mod autocorrelation;
pub mod equilibration;
pub mod exponential_fit;
pub mod reference_lines;
