use crate::matrix::Matrix;

/// Utility function to view a row-major matrix as a faer matrix.
///
/// # Arguments
///
/// * `mat` - A row-major matrix.
///
/// # Returns
///
/// A faer matrix view borrowing the same buffer.
pub(crate) fn matrix_to_faer(mat: &Matrix) -> faer::MatRef<'_, f64> {
    faer::mat::from_row_major_slice(mat.as_slice(), mat.rows(), mat.cols())
}

/// Utility function to copy a faer matrix into a row-major matrix.
///
/// # Arguments
///
/// * `mat` - A faer matrix view.
///
/// # Returns
///
/// An owned row-major matrix.
pub(crate) fn faer_to_matrix(mat: faer::MatRef<'_, f64>) -> Matrix {
    Matrix::from_fn(mat.nrows(), mat.ncols(), |i, j| mat.read(i, j))
}
