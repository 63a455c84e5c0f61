//! Data models for sampled observables and the curves derived from them.
//!
//! - [`kind`] - the closed set of observables a simulation run records
//! - [`series`] - scalar and 3-vector time series
//! - [`curve`] - paired x/y curves and lag-indexed autocorrelation curves
//! - [`curve_set`] - keyed collections of curves from independent runs

pub mod curve;
pub mod curve_set;
pub mod kind;
pub mod series;
