use evoked_linalg::LinalgError;

use crate::handle::MatrixHandle;

/// An error type for the matrix store.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No live matrix is registered under the handle.
    #[error("Matrix {0} not found")]
    NotFound(MatrixHandle),

    /// The supplied buffer does not describe a valid matrix.
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}
