//! SVD least-squares solver.
//!
//! Alternative to the normal equation: instead of forming and inverting
//! `XᵗX` we hand the design matrix to `nalgebra`'s SVD, which copes with
//! tall and rank-deficient systems without squaring the condition number.
//!
//! With seven columns the decomposition is cheap even for large uploads.

use nalgebra::{DMatrix, DVector};

use crate::math::Matrix;

/// Solve `min ‖X β - y‖²` using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly or if
/// `y` does not have one entry per row of `x`.
pub fn solve_least_squares(x: &Matrix, y: &[f64]) -> Option<Vec<f64>> {
    if y.len() != x.rows() {
        return None;
    }

    let (rows, cols) = x.shape();
    let x = DMatrix::from_fn(rows, cols, |r, c| x.get(r, c));
    let y = DVector::from_column_slice(y);
    let svd = x.svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(&y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta.iter().copied().collect());
            }
        }
    }

    None
}
