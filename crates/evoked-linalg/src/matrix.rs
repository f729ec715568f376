use std::ops::{Index, IndexMut};

use crate::error::LinalgError;

/// A dense matrix of `f64` values stored contiguously in row-major order.
///
/// Rows are samples (time points) and columns are channels or reference
/// components throughout this workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// Create a matrix taking ownership of a row-major buffer.
    ///
    /// # Arguments
    ///
    /// * `data` - The row-major values, `rows * cols` of them.
    /// * `rows` - The number of rows.
    /// * `cols` - The number of columns.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::EmptyMatrix`] if either dimension is zero and
    /// [`LinalgError::InvalidShape`] if the buffer length does not match.
    pub fn from_row_major(data: Vec<f64>, rows: usize, cols: usize) -> Result<Self, LinalgError> {
        if rows == 0 || cols == 0 {
            return Err(LinalgError::EmptyMatrix(rows, cols));
        }
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(LinalgError::InvalidShape(data.len(), rows, cols));
        }
        Ok(Self { data, rows, cols })
    }

    /// Create a matrix by copying a borrowed row-major buffer.
    ///
    /// Same validation rules as [`Matrix::from_row_major`].
    pub fn from_slice(data: &[f64], rows: usize, cols: usize) -> Result<Self, LinalgError> {
        Self::from_row_major(data.to_vec(), rows, cols)
    }

    /// Create a matrix from a function of the `(row, col)` index.
    ///
    /// Zero-sized dimensions are allowed here, since factorizations of
    /// rank-deficient inputs legitimately produce them.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { data, rows, cols }
    }

    /// Create a matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Create a matrix whose columns are the given vectors.
    ///
    /// All columns must have the same length.
    pub fn from_columns(columns: &[Vec<f64>]) -> Result<Self, LinalgError> {
        let cols = columns.len();
        let rows = columns.first().map_or(0, Vec::len);
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(LinalgError::InvalidShape(bad.len(), rows, cols));
        }
        if rows == 0 || cols == 0 {
            return Err(LinalgError::EmptyMatrix(rows, cols));
        }
        Ok(Self::from_fn(rows, cols, |r, c| columns[c][r]))
    }

    /// The number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The `(rows, cols)` shape.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Whether the matrix has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The row-major data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Consume the matrix and return its row-major buffer.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// A view of row `r`.
    pub fn row(&self, r: usize) -> &[f64] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// A mutable view of row `r`.
    pub fn row_mut(&mut self, r: usize) -> &mut [f64] {
        &mut self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Copy column `c` into a new vector.
    pub fn column(&self, c: usize) -> Vec<f64> {
        (0..self.rows).map(|r| self[(r, c)]).collect()
    }

    /// Overwrite column `c` with `values`.
    ///
    /// # Errors
    ///
    /// [`LinalgError::ColumnOutOfBounds`] if `c` is not a column of the
    /// matrix, [`LinalgError::InvalidShape`] if `values` does not hold one
    /// value per row. The matrix is left untouched on error.
    pub fn set_column(&mut self, c: usize, values: &[f64]) -> Result<(), LinalgError> {
        if c >= self.cols {
            return Err(LinalgError::ColumnOutOfBounds(c, self.cols));
        }
        if values.len() != self.rows {
            return Err(LinalgError::InvalidShape(values.len(), self.rows, 1));
        }
        for (r, v) in values.iter().enumerate() {
            self[(r, c)] = *v;
        }
        Ok(())
    }

    /// Return the transposed matrix.
    pub fn transpose(&self) -> Self {
        Self::from_fn(self.cols, self.rows, |r, c| self[(c, r)])
    }

    /// Whether every element is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (r, c): (usize, usize)) -> &Self::Output {
        assert!(r < self.rows && c < self.cols, "index out of bounds");
        &self.data[r * self.cols + c]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut Self::Output {
        assert!(r < self.rows && c < self.cols, "index out of bounds");
        &mut self.data[r * self.cols + c]
    }
}
