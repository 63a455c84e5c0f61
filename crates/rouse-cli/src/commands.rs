pub mod autocorr;
pub mod intersect;
pub mod process;
