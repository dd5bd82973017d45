//! Model fitting.
//!
//! Responsibilities:
//!
//! - enforce the minimum training-set size
//! - build the design matrix and rescaled targets
//! - solve the least-squares problem (normal equation or SVD)

pub mod trainer;

pub use trainer::*;
