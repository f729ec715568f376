use crate::{error::LinalgError, matrix::Matrix};

/// Eigendecomposition of a symmetric matrix.
///
/// Eigenpairs are ordered by ascending eigenvalue; column `i` of
/// `eigenvectors` belongs to `eigenvalues[i]`.
#[derive(Debug, Clone)]
pub struct SymmetricEigen {
    /// The eigenvalues in ascending order.
    pub eigenvalues: Vec<f64>,
    /// The unit eigenvectors stored as columns.
    pub eigenvectors: Matrix,
}

/// Dense linear algebra primitives needed by the scoring engines.
///
/// Implementations must be deterministic: the same input always yields the
/// same output, which is what makes concurrent cache writes harmless.
pub trait LinalgBackend: Send + Sync {
    /// Orthonormal basis of the column space of `mat`.
    ///
    /// Uses a column-pivoted QR and keeps only the columns of the thin Q
    /// factor that correspond to the numerical rank of `mat`. A full rank
    /// input yields `min(rows, cols)` columns.
    fn economy_qr(&self, mat: &Matrix) -> Matrix;

    /// Singular values of `mat` in descending order.
    fn singular_values(&self, mat: &Matrix) -> Vec<f64>;

    /// Eigendecomposition of the symmetric matrix `mat`.
    ///
    /// Only the lower triangle is read.
    fn symmetric_eigen(&self, mat: &Matrix) -> Result<SymmetricEigen, LinalgError>;

    /// Inverse of the square matrix `mat`.
    ///
    /// Fails with [`LinalgError::SingularMatrix`] when `mat` is not invertible
    /// within numerical tolerance.
    fn invert(&self, mat: &Matrix) -> Result<Matrix, LinalgError>;

    /// The product `lhs * rhs`.
    fn matmul(&self, lhs: &Matrix, rhs: &Matrix) -> Result<Matrix, LinalgError>;

    /// The product `lhs^T * rhs`.
    fn transpose_matmul(&self, lhs: &Matrix, rhs: &Matrix) -> Result<Matrix, LinalgError>;
}
