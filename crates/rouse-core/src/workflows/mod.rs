//! # Workflows Module
//!
//! End-to-end procedures built from the engine tasks.
//!
//! - **Relaxation** ([`relaxation`]) - one time series to an autocorrelation curve, an
//!   exponential fit and a relaxation time
//! - **Ensemble** ([`ensemble`]) - per-run `(N, τ₀)` curves to a cross-run mean with
//!   reference and regression lines
//! - **Pipeline** ([`pipeline`]) - sequences both over a batch of runs, skipping and
//!   recording per-residue failures, and hands every result to a [`pipeline::AnalysisSink`]

pub mod ensemble;
pub mod pipeline;
pub mod relaxation;
