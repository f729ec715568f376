use evoked_linalg::{LinalgError, Matrix};
use evoked_store::{MatrixHandle, MatrixStore};

use crate::error::ScoreError;

/// A borrowed row-major buffer, valid for the duration of one call.
#[derive(Debug, Clone, Copy)]
pub struct InlineMatrix<'a> {
    data: &'a [f64],
    rows: usize,
    cols: usize,
}

impl<'a> InlineMatrix<'a> {
    /// Wrap a row-major buffer of `rows * cols` values.
    pub fn new(data: &'a [f64], rows: usize, cols: usize) -> Result<Self, LinalgError> {
        if rows == 0 || cols == 0 {
            return Err(LinalgError::EmptyMatrix(rows, cols));
        }
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(LinalgError::InvalidShape(data.len(), rows, cols));
        }
        Ok(Self { data, rows, cols })
    }

    /// The number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The borrowed row-major data.
    pub fn as_slice(&self) -> &'a [f64] {
        self.data
    }

    /// Copy the buffer into an owned matrix.
    pub fn to_matrix(&self) -> Result<Matrix, LinalgError> {
        Matrix::from_slice(self.data, self.rows, self.cols)
    }
}

/// One operand of a scoring call.
///
/// Either a matrix owned by the store, addressed by handle, or an inline
/// buffer owned by the caller.
#[derive(Debug, Clone, Copy)]
pub enum MatrixDescriptor<'a> {
    /// A matrix held by the [`MatrixStore`].
    Stored(MatrixHandle),
    /// A caller-owned buffer.
    Inline(InlineMatrix<'a>),
}

impl<'a> MatrixDescriptor<'a> {
    /// Reference a stored matrix.
    pub fn stored(handle: MatrixHandle) -> Self {
        Self::Stored(handle)
    }

    /// Reference a caller-owned row-major buffer.
    pub fn inline(data: &'a [f64], rows: usize, cols: usize) -> Result<Self, ScoreError> {
        Ok(Self::Inline(InlineMatrix::new(data, rows, cols)?))
    }

    /// Build a descriptor from its flat wire form.
    ///
    /// A `handle` of `0` selects the inline buffer; any other value refers
    /// to a stored matrix and the remaining fields are ignored.
    ///
    /// # Arguments
    ///
    /// * `handle` - The raw handle, or `0` for inline data.
    /// * `data` - The row-major buffer, required when `handle` is `0`.
    /// * `rows` - The number of rows of the inline buffer.
    /// * `cols` - The number of columns of the inline buffer.
    pub fn from_raw(
        handle: u64,
        data: Option<&'a [f64]>,
        rows: usize,
        cols: usize,
    ) -> Result<Self, ScoreError> {
        match MatrixHandle::new(handle) {
            Some(handle) => Ok(Self::Stored(handle)),
            None => {
                let data = data.ok_or(ScoreError::MissingInlineData)?;
                Self::inline(data, rows, cols)
            }
        }
    }

    /// The handle, for stored descriptors.
    pub fn handle(&self) -> Option<MatrixHandle> {
        match self {
            Self::Stored(handle) => Some(*handle),
            Self::Inline(_) => None,
        }
    }

    /// Resolve the descriptor into an owned copy of the matrix.
    ///
    /// Fails with [`ScoreError::NotFound`] for a handle that is not live and
    /// with [`ScoreError::DegenerateInput`] if the matrix holds non-finite
    /// values.
    pub fn resolve(&self, store: &MatrixStore) -> Result<Matrix, ScoreError> {
        let matrix = match self {
            Self::Stored(handle) => store.fetch(*handle)?,
            Self::Inline(inline) => inline.to_matrix()?,
        };
        ensure_finite(&matrix)?;
        Ok(matrix)
    }
}

impl From<MatrixHandle> for MatrixDescriptor<'_> {
    fn from(handle: MatrixHandle) -> Self {
        Self::Stored(handle)
    }
}

impl<'a> From<&'a Matrix> for MatrixDescriptor<'a> {
    fn from(matrix: &'a Matrix) -> Self {
        Self::Inline(InlineMatrix {
            data: matrix.as_slice(),
            rows: matrix.rows(),
            cols: matrix.cols(),
        })
    }
}

pub(crate) fn ensure_finite(matrix: &Matrix) -> Result<(), ScoreError> {
    if !matrix.is_finite() {
        return Err(ScoreError::DegenerateInput(
            "matrix contains non-finite values".to_string(),
        ));
    }
    Ok(())
}
