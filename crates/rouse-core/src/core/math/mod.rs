//! Numerical building blocks: interpolation, curve intersection, linear least squares
//! and summary statistics.

pub mod interpolation;
pub mod intersection;
pub mod regression;
pub mod statistics;
