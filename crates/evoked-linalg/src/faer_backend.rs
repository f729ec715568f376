use faer::prelude::SpSolver;

use crate::{
    backend::{LinalgBackend, SymmetricEigen},
    error::LinalgError,
    matrix::Matrix,
    utils::{faer_to_matrix, matrix_to_faer},
};

/// [`LinalgBackend`] implemented with the `faer` dense solvers.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaerBackend;

impl FaerBackend {
    /// Create a new backend.
    pub fn new() -> Self {
        Self
    }
}

/// Number of leading diagonal entries of a pivoted R factor above the rank
/// threshold `max(rows, cols) * eps * |r_00|`.
fn numerical_rank(r: faer::MatRef<'_, f64>, max_dim: usize) -> usize {
    let diag = r.nrows().min(r.ncols());
    if diag == 0 {
        return 0;
    }

    let r00 = r.read(0, 0).abs();
    if r00 == 0.0 || !r00.is_finite() {
        return 0;
    }

    let tol = max_dim as f64 * f64::EPSILON * r00;
    (0..diag).take_while(|&i| r.read(i, i).abs() > tol).count()
}

fn ensure_square(mat: &Matrix) -> Result<usize, LinalgError> {
    if mat.rows() != mat.cols() {
        return Err(LinalgError::NotSquare(mat.rows(), mat.cols()));
    }
    Ok(mat.rows())
}

impl LinalgBackend for FaerBackend {
    fn economy_qr(&self, mat: &Matrix) -> Matrix {
        let (rows, cols) = mat.shape();
        if rows == 0 || cols == 0 {
            return Matrix::zeros(rows, 0);
        }

        // NOTE: the column pivoting keeps |r_ii| non-increasing so the first
        // `rank` columns of Q span the column space of the input.
        let qr = matrix_to_faer(mat).col_piv_qr();
        let r = qr.compute_thin_r();
        let rank = numerical_rank(r.as_ref(), rows.max(cols));

        let q = qr.compute_thin_q();
        faer_to_matrix(q.as_ref().subcols(0, rank))
    }

    fn singular_values(&self, mat: &Matrix) -> Vec<f64> {
        if mat.is_empty() {
            return Vec::new();
        }
        let mut values = matrix_to_faer(mat).singular_values();
        values.sort_by(|a, b| b.total_cmp(a));
        values
    }

    fn symmetric_eigen(&self, mat: &Matrix) -> Result<SymmetricEigen, LinalgError> {
        let n = ensure_square(mat)?;
        if n == 0 {
            return Ok(SymmetricEigen {
                eigenvalues: Vec::new(),
                eigenvectors: Matrix::zeros(0, 0),
            });
        }

        let evd = matrix_to_faer(mat).selfadjoint_eigendecomposition(faer::Side::Lower);
        let s = evd.s().column_vector();
        let u = evd.u();

        // sort the eigenpairs by ascending eigenvalue, keeping the solver order on ties
        let mut order = (0..n).collect::<Vec<_>>();
        order.sort_by(|&a, &b| s.read(a).total_cmp(&s.read(b)));

        let eigenvalues = order.iter().map(|&i| s.read(i)).collect();
        let eigenvectors = Matrix::from_fn(n, n, |r, c| u.read(r, order[c]));

        Ok(SymmetricEigen {
            eigenvalues,
            eigenvectors,
        })
    }

    fn invert(&self, mat: &Matrix) -> Result<Matrix, LinalgError> {
        let n = ensure_square(mat)?;
        if n == 0 {
            return Ok(Matrix::zeros(0, 0));
        }

        // reject matrices whose reciprocal condition number is below working precision
        let sv = self.singular_values(mat);
        let (s_max, s_min) = (sv[0], sv[n - 1]);
        let rcond = if s_max > 0.0 { s_min / s_max } else { 0.0 };
        if !rcond.is_finite() || rcond < n as f64 * f64::EPSILON {
            return Err(LinalgError::SingularMatrix(rcond));
        }

        let inv = matrix_to_faer(mat)
            .partial_piv_lu()
            .solve(faer::Mat::<f64>::identity(n, n));
        let inv = faer_to_matrix(inv.as_ref());
        if !inv.is_finite() {
            return Err(LinalgError::SingularMatrix(rcond));
        }

        Ok(inv)
    }

    fn matmul(&self, lhs: &Matrix, rhs: &Matrix) -> Result<Matrix, LinalgError> {
        if lhs.cols() != rhs.rows() {
            return Err(LinalgError::DimensionMismatch(lhs.shape(), rhs.shape()));
        }
        if lhs.rows() == 0 || rhs.cols() == 0 || lhs.cols() == 0 {
            return Ok(Matrix::zeros(lhs.rows(), rhs.cols()));
        }
        let out = matrix_to_faer(lhs) * matrix_to_faer(rhs);
        Ok(faer_to_matrix(out.as_ref()))
    }

    fn transpose_matmul(&self, lhs: &Matrix, rhs: &Matrix) -> Result<Matrix, LinalgError> {
        if lhs.rows() != rhs.rows() {
            return Err(LinalgError::DimensionMismatch(lhs.shape(), rhs.shape()));
        }
        if lhs.cols() == 0 || rhs.cols() == 0 || lhs.rows() == 0 {
            return Ok(Matrix::zeros(lhs.cols(), rhs.cols()));
        }
        let out = matrix_to_faer(lhs).transpose() * matrix_to_faer(rhs);
        Ok(faer_to_matrix(out.as_ref()))
    }
}
