//! # Core Module
//!
//! Foundation types and algorithms shared by every analysis task.
//!
//! - **Data models** ([`models`]) - time series, curves, lag curves and keyed curve sets
//! - **Numerics** ([`math`]) - linear interpolation, curve intersection, least squares and
//!   summary statistics
//! - **File I/O** ([`io`]) - whitespace-separated column readers and writers
//! - **Errors** ([`error`]) - the computational error taxonomy

pub mod error;
pub mod io;
pub mod math;
pub mod models;
