/// An error type for the linear algebra kernels.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    /// The buffer length does not match the requested shape.
    #[error("Data length ({0}) does not match the matrix size ({1}x{2})")]
    InvalidShape(usize, usize, usize),

    /// The matrix has no rows or no columns.
    #[error("Matrix must have at least one row and one column, got {0}x{1}")]
    EmptyMatrix(usize, usize),

    /// A column index past the last column.
    #[error("Column index {0} out of bounds for a matrix with {1} columns")]
    ColumnOutOfBounds(usize, usize),

    /// A square matrix was required.
    #[error("Expected a square matrix, got {0}x{1}")]
    NotSquare(usize, usize),

    /// The operands of a product have incompatible shapes.
    #[error("Incompatible shapes for product: {0:?} and {1:?}")]
    DimensionMismatch((usize, usize), (usize, usize)),

    /// The matrix is not invertible within numerical tolerance.
    #[error("Matrix is singular (reciprocal condition number {0:e})")]
    SingularMatrix(f64),
}
