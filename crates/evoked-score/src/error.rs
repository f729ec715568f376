use evoked_linalg::LinalgError;
use evoked_store::{MatrixHandle, StoreError};

/// An error type for the scoring engines.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    /// A descriptor references a handle that is not live.
    #[error("Matrix {0} not found")]
    NotFound(MatrixHandle),

    /// The two operands do not have the same number of rows.
    #[error("Row count mismatch: {left} rows vs {right} rows")]
    DimensionMismatch {
        /// Rows of the first operand.
        left: usize,
        /// Rows of the second operand.
        right: usize,
    },

    /// An intermediate matrix could not be inverted.
    #[error("Matrix is singular (reciprocal condition number {0:e})")]
    SingularMatrix(f64),

    /// The input leads to an ill-posed intermediate problem.
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// A raw descriptor selected inline data but carried no buffer.
    #[error("Descriptor with handle 0 requires an inline buffer")]
    MissingInlineData,

    /// Any other linear algebra failure, e.g. an invalid inline buffer.
    #[error(transparent)]
    Linalg(LinalgError),
}

impl From<LinalgError> for ScoreError {
    fn from(err: LinalgError) -> Self {
        match err {
            LinalgError::SingularMatrix(rcond) => ScoreError::SingularMatrix(rcond),
            other => ScoreError::Linalg(other),
        }
    }
}

impl From<StoreError> for ScoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(handle) => ScoreError::NotFound(handle),
            StoreError::Linalg(err) => err.into(),
        }
    }
}
