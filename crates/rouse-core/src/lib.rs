//! # Rouse Core Library
//!
//! Post-processing of Monte-Carlo polymer simulation ensembles: time-lag autocorrelation of
//! end-to-end observables, single-exponential decay fitting to extract the Rouse relaxation
//! time, and aggregation of per-run curves onto a common grid.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout so that the numerical kernels stay free of
//! configuration and I/O concerns.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Curve`, `LagCurve`, `CurveSet`,
//!   `TimeSeries`), pure numerical routines (interpolation, bisection, least squares,
//!   summary statistics) and plain-text column I/O.
//!
//! - **[`engine`]: The Logic Core.** Typed configuration with builders, the error taxonomy,
//!   progress reporting, and the computational tasks: autocorrelation (serial and
//!   data-parallel), exponential decay fitting, multi-run aggregation, reference lines and
//!   equilibration checks.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures that chain the tasks for one
//!   time series (`relaxation`), for a set of per-run curves (`ensemble`), or for a
//!   whole batch of run directories (`pipeline`).

pub mod core;
pub mod engine;
pub mod workflows;
