//! Linear algebra: hand-rolled dense matrix routines and an SVD solver.

pub mod matrix;
pub mod ols;

pub use matrix::*;
pub use ols::*;
