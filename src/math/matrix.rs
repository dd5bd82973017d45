//! Dense matrix primitives for the normal-equation fit.
//!
//! The feature width is fixed and small, so everything here is the textbook
//! O(n·m·p) algorithm on a row-major `Vec<f64>`. No BLAS, no shortcuts.
//!
//! A [`Matrix`] is guaranteed non-empty and rectangular by construction, which
//! makes [`transpose`] total. Operations that combine two shapes check
//! compatibility and report [`MathError::DimensionMismatch`].

use log::warn;

/// Pivot magnitude below which a matrix is treated as singular.
pub const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Failures of the matrix routines.
#[derive(Debug, Clone, PartialEq)]
pub enum MathError {
    /// A matrix was built from zero rows or zero columns.
    Empty,
    /// Rows of different lengths were supplied.
    Ragged { row: usize, expected: usize, found: usize },
    /// Operand shapes are incompatible for the requested operation.
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },
    /// Inversion requires a square matrix.
    NotSquare { rows: usize, cols: usize },
    /// A pivot fell below [`SINGULAR_TOLERANCE`] during elimination.
    Singular { column: usize, pivot: f64 },
}

impl std::fmt::Display for MathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MathError::Empty => write!(f, "matrix has no rows or no columns"),
            MathError::Ragged { row, expected, found } => write!(
                f,
                "row {row} has {found} columns, expected {expected}"
            ),
            MathError::DimensionMismatch { op, left, right } => write!(
                f,
                "{op}: incompatible shapes {}x{} and {}x{}",
                left.0, left.1, right.0, right.1
            ),
            MathError::NotSquare { rows, cols } => {
                write!(f, "cannot invert a non-square {rows}x{cols} matrix")
            }
            MathError::Singular { column, pivot } => {
                write!(f, "singular matrix (pivot {pivot:e} in column {column})")
            }
        }
    }
}

impl std::error::Error for MathError {}

/// Row-major dense matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Build a matrix from a list of rows.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, MathError> {
        let first = rows.first().ok_or(MathError::Empty)?;
        let cols = first.as_ref().len();
        if cols == 0 {
            return Err(MathError::Empty);
        }

        let mut data = Vec::with_capacity(rows.len() * cols);
        for (idx, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(MathError::Ragged {
                    row: idx,
                    expected: cols,
                    found: row.len(),
                });
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// The `n`×`n` identity matrix.
    ///
    /// # Panics
    /// Panics if `n == 0`.
    pub fn identity(n: usize) -> Self {
        assert!(n > 0, "identity matrix must have at least one row");
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        Self { rows: n, cols: n, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Copy out as nested rows (handy for tests and reports).
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows).map(|r| self.row(r).to_vec()).collect()
    }

    /// Add `lambda` to every diagonal entry. Used by the ridge policy.
    pub fn add_diagonal(&self, lambda: f64) -> Result<Self, MathError> {
        if self.rows != self.cols {
            return Err(MathError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        let mut out = self.clone();
        for i in 0..self.rows {
            out.data[i * self.cols + i] += lambda;
        }
        Ok(out)
    }
}

/// Swap rows and columns.
pub fn transpose(m: &Matrix) -> Matrix {
    let mut data = Vec::with_capacity(m.data.len());
    for c in 0..m.cols {
        for r in 0..m.rows {
            data.push(m.get(r, c));
        }
    }
    Matrix {
        rows: m.cols,
        cols: m.rows,
        data,
    }
}

/// Standard matrix product `a · b`.
pub fn multiply(a: &Matrix, b: &Matrix) -> Result<Matrix, MathError> {
    if a.cols != b.rows {
        return Err(MathError::DimensionMismatch {
            op: "multiply",
            left: a.shape(),
            right: b.shape(),
        });
    }

    let mut data = vec![0.0; a.rows * b.cols];
    for i in 0..a.rows {
        for j in 0..b.cols {
            let mut sum = 0.0;
            for k in 0..a.cols {
                sum += a.get(i, k) * b.get(k, j);
            }
            data[i * b.cols + j] = sum;
        }
    }

    Ok(Matrix {
        rows: a.rows,
        cols: b.cols,
        data,
    })
}

/// Matrix-vector product `m · v` (one dot product per row).
pub fn multiply_vector(m: &Matrix, v: &[f64]) -> Result<Vec<f64>, MathError> {
    if m.cols != v.len() {
        return Err(MathError::DimensionMismatch {
            op: "multiply_vector",
            left: m.shape(),
            right: (v.len(), 1),
        });
    }
    Ok((0..m.rows).map(|r| dot(m.row(r), v)).collect())
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Result of [`inverse`].
#[derive(Debug, Clone, PartialEq)]
pub struct Inversion {
    pub matrix: Matrix,
    /// `true` when elimination hit a singular pivot and `matrix` is the
    /// identity substitute rather than a real inverse.
    pub fallback: bool,
}

/// Invert with the identity fallback.
///
/// Singular input yields `Inversion { matrix: I, fallback: true }`. The
/// identity is not an inverse of anything but the identity itself; callers
/// that need a real inverse should use [`try_inverse`].
pub fn inverse(m: &Matrix) -> Result<Inversion, MathError> {
    match try_inverse(m) {
        Ok(matrix) => Ok(Inversion {
            matrix,
            fallback: false,
        }),
        Err(MathError::Singular { column, pivot }) => {
            warn!("matrix is singular (column {column}, pivot {pivot:e}); substituting identity");
            Ok(Inversion {
                matrix: Matrix::identity(m.rows),
                fallback: true,
            })
        }
        Err(e) => Err(e),
    }
}

/// Gauss-Jordan elimination with partial pivoting on `[M | I]`.
pub fn try_inverse(m: &Matrix) -> Result<Matrix, MathError> {
    if m.rows != m.cols {
        return Err(MathError::NotSquare {
            rows: m.rows,
            cols: m.cols,
        });
    }

    let n = m.rows;
    let width = 2 * n;
    let mut aug: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            let mut row = Vec::with_capacity(width);
            row.extend_from_slice(m.row(i));
            row.extend((0..n).map(|j| if i == j { 1.0 } else { 0.0 }));
            row
        })
        .collect();

    for i in 0..n {
        // Largest magnitude wins; on ties the earliest row is kept.
        let mut max_row = i;
        for k in (i + 1)..n {
            if aug[k][i].abs() > aug[max_row][i].abs() {
                max_row = k;
            }
        }
        aug.swap(i, max_row);

        let pivot = aug[i][i];
        if pivot.is_nan() || pivot.abs() < SINGULAR_TOLERANCE {
            return Err(MathError::Singular { column: i, pivot });
        }

        for v in aug[i].iter_mut() {
            *v /= pivot;
        }

        let pivot_row = aug[i].clone();
        for (j, row) in aug.iter_mut().enumerate() {
            if j == i {
                continue;
            }
            let factor = row[i];
            if factor == 0.0 {
                continue;
            }
            for (v, p) in row.iter_mut().zip(&pivot_row) {
                *v -= factor * p;
            }
        }
    }

    let data = aug.into_iter().flat_map(|row| row[n..].to_vec()).collect();
    Ok(Matrix {
        rows: n,
        cols: n,
        data,
    })
}
