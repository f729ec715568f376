use std::sync::{Mutex, MutexGuard, PoisonError};

use evoked_linalg::{LinalgError, Matrix};

use crate::{
    cache::DecompositionCache,
    error::StoreError,
    handle::{Generation, MatrixHandle},
    repository::MatrixRepository,
};

/// Result of looking up the cached decomposition of a stored matrix.
#[derive(Debug, Clone)]
pub enum DecompositionLookup {
    /// The cached factor.
    Cached(Matrix),
    /// No factor is cached yet; a copy of the stored matrix to compute it from.
    Missing {
        /// Copy of the stored matrix.
        matrix: Matrix,
        /// Generation to pass back to [`MatrixStore::store_decomposition`].
        generation: Generation,
    },
}

#[derive(Debug, Default)]
struct StoreState {
    repository: MatrixRepository,
    cache: DecompositionCache,
}

/// Thread-safe store of matrices addressed by [`MatrixHandle`].
///
/// The repository and the decomposition cache sit behind one exclusive
/// lock, so allocation, lookup, deletion and cache access never interleave.
/// Matrices are copied in and out; no caller memory is retained and no
/// reference into the store escapes the lock.
///
/// Example:
///
/// ```
/// use evoked_store::MatrixStore;
///
/// let store = MatrixStore::new();
/// let handle = store.allocate(&[1.0, 2.0, 3.0], 3, 1).unwrap();
/// assert_eq!(store.fetch(handle).unwrap().column(0), vec![1.0, 2.0, 3.0]);
/// store.delete(handle);
/// assert!(store.fetch(handle).is_err());
/// ```
#[derive(Debug, Default)]
pub struct MatrixStore {
    state: Mutex<StoreState>,
}

impl MatrixStore {
    /// Create an empty store whose first handle will be `1`.
    pub fn new() -> Self {
        Self::default()
    }

    // every critical section leaves both maps consistent, so a panic in
    // another thread does not invalidate the state
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy a row-major buffer into the store.
    ///
    /// # Arguments
    ///
    /// * `data` - The row-major values, `rows * cols` of them.
    /// * `rows` - The number of rows.
    /// * `cols` - The number of columns.
    ///
    /// # Returns
    ///
    /// The handle of the new matrix.
    pub fn allocate(&self, data: &[f64], rows: usize, cols: usize) -> Result<MatrixHandle, StoreError> {
        let matrix = Matrix::from_slice(data, rows, cols)?;
        self.insert(matrix)
    }

    /// Move a matrix into the store and return its handle.
    ///
    /// Fails with [`LinalgError::EmptyMatrix`] if the matrix has no rows or
    /// no columns.
    pub fn insert(&self, matrix: Matrix) -> Result<MatrixHandle, StoreError> {
        let (rows, cols) = matrix.shape();
        if rows == 0 || cols == 0 {
            return Err(LinalgError::EmptyMatrix(rows, cols).into());
        }
        let (handle, _) = self.lock().repository.insert(matrix);
        log::debug!("allocated matrix {} ({}x{})", handle, rows, cols);
        Ok(handle)
    }

    /// Return a copy of the matrix stored under `handle`.
    pub fn fetch(&self, handle: MatrixHandle) -> Result<Matrix, StoreError> {
        self.lock()
            .repository
            .get(handle)
            .map(|stored| stored.matrix.clone())
            .ok_or(StoreError::NotFound(handle))
    }

    /// Return a copy of the matrix together with its generation, for
    /// computing a decomposition that will be written back.
    pub fn fetch_for_decomposition(
        &self,
        handle: MatrixHandle,
    ) -> Result<(Matrix, Generation), StoreError> {
        self.lock()
            .repository
            .get(handle)
            .map(|stored| (stored.matrix.clone(), stored.generation))
            .ok_or(StoreError::NotFound(handle))
    }

    /// Return the cached decomposition of `handle`, or a copy of the matrix
    /// to compute it from.
    ///
    /// The cache is only consulted when `handle` is live.
    pub fn decomposition_or_matrix(
        &self,
        handle: MatrixHandle,
    ) -> Result<DecompositionLookup, StoreError> {
        let state = self.lock();
        let stored = state
            .repository
            .get(handle)
            .ok_or(StoreError::NotFound(handle))?;

        if let Some(factor) = state.cache.get(handle, stored.generation) {
            log::trace!("decomposition cache hit for {}", handle);
            return Ok(DecompositionLookup::Cached(factor.clone()));
        }

        log::trace!("decomposition cache miss for {}", handle);
        Ok(DecompositionLookup::Missing {
            matrix: stored.matrix.clone(),
            generation: stored.generation,
        })
    }

    /// Cache `factor` as the decomposition of `handle`.
    ///
    /// Overwrites any existing entry. The write is discarded if the matrix
    /// was deleted, or replaced after a clear, since `generation` was read.
    ///
    /// # Returns
    ///
    /// Whether the factor was stored.
    pub fn store_decomposition(
        &self,
        handle: MatrixHandle,
        generation: Generation,
        factor: Matrix,
    ) -> bool {
        let mut state = self.lock();
        let live = state
            .repository
            .get(handle)
            .is_some_and(|stored| stored.generation == generation);
        if !live {
            log::debug!("discarding decomposition for stale matrix {}", handle);
            return false;
        }
        state.cache.insert(handle, generation, factor);
        true
    }

    /// Remove a matrix and its cached decomposition.
    ///
    /// Deleting an absent handle is not an error.
    ///
    /// # Returns
    ///
    /// Whether a matrix was removed.
    pub fn delete(&self, handle: MatrixHandle) -> bool {
        let mut state = self.lock();
        state.cache.remove(handle);
        let removed = state.repository.remove(handle);
        if removed {
            log::debug!("deleted matrix {}", handle);
        }
        removed
    }

    /// Remove every matrix and decomposition and restart handle numbering.
    pub fn clear(&self) {
        let mut state = self.lock();
        let count = state.repository.len();
        state.cache.clear();
        state.repository.clear();
        log::debug!("cleared {} matrices", count);
    }

    /// Whether `handle` refers to a live matrix.
    pub fn contains(&self, handle: MatrixHandle) -> bool {
        self.lock().repository.contains(handle)
    }

    /// The number of live matrices.
    pub fn len(&self) -> usize {
        self.lock().repository.len()
    }

    /// Whether the store holds no matrices.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of cached decompositions.
    pub fn cached_decompositions(&self) -> usize {
        self.lock().cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_allocate_fetch() -> Result<(), StoreError> {
        let store = MatrixStore::new();
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let handle = store.allocate(&data, 3, 2)?;
        assert_eq!(handle.get(), 1);

        let m = store.fetch(handle)?;
        assert_eq!(m.shape(), (3, 2));
        for (a, b) in m.as_slice().iter().zip(data.iter()) {
            assert_relative_eq!(a, b);
        }
        Ok(())
    }

    #[test]
    fn test_allocate_invalid_buffer() {
        let store = MatrixStore::new();
        assert_eq!(
            store.allocate(&[1.0, 2.0, 3.0], 2, 2),
            Err(StoreError::Linalg(LinalgError::InvalidShape(3, 2, 2)))
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_empty_matrix() {
        let store = MatrixStore::new();
        assert_eq!(
            store.insert(Matrix::zeros(3, 0)),
            Err(StoreError::Linalg(LinalgError::EmptyMatrix(3, 0)))
        );
        assert_eq!(
            store.insert(Matrix::from_fn(0, 2, |_, _| 1.0)),
            Err(StoreError::Linalg(LinalgError::EmptyMatrix(0, 2)))
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_fetch_missing() {
        let store = MatrixStore::new();
        let handle = MatrixHandle::new(9).unwrap();
        assert_eq!(store.fetch(handle), Err(StoreError::NotFound(handle)));
        assert!(matches!(
            store.decomposition_or_matrix(handle),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_idempotent() -> Result<(), StoreError> {
        let store = MatrixStore::new();
        let handle = store.allocate(&[1.0, 2.0], 2, 1)?;
        assert!(store.delete(handle));
        assert!(!store.delete(handle));
        assert!(!store.delete(MatrixHandle::new(1234).unwrap()));
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn test_clear_restarts_handles() -> Result<(), StoreError> {
        let store = MatrixStore::new();
        let first = store.allocate(&[1.0], 1, 1)?;
        store.allocate(&[2.0], 1, 1)?;
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.allocate(&[3.0], 1, 1)?, first);
        Ok(())
    }

    #[test]
    fn test_decomposition_lifecycle() -> Result<(), StoreError> {
        let store = MatrixStore::new();
        let handle = store.allocate(&[1.0, 2.0, 3.0], 3, 1)?;

        let DecompositionLookup::Missing { matrix, generation } =
            store.decomposition_or_matrix(handle)?
        else {
            panic!("expected a cache miss");
        };
        assert_eq!(matrix.shape(), (3, 1));
        assert!(store.store_decomposition(handle, generation, Matrix::zeros(3, 1)));
        assert_eq!(store.cached_decompositions(), 1);

        assert!(matches!(
            store.decomposition_or_matrix(handle)?,
            DecompositionLookup::Cached(_)
        ));

        store.delete(handle);
        assert_eq!(store.cached_decompositions(), 0);
        Ok(())
    }

    #[test]
    fn test_stale_decomposition_discarded() -> Result<(), StoreError> {
        let store = MatrixStore::new();
        let handle = store.allocate(&[1.0, 2.0, 3.0], 3, 1)?;
        let (_, generation) = store.fetch_for_decomposition(handle)?;

        // the id is reissued to a different matrix after a clear
        store.clear();
        let reissued = store.allocate(&[9.0, 8.0, 7.0, 6.0], 2, 2)?;
        assert_eq!(reissued, handle);

        assert!(!store.store_decomposition(handle, generation, Matrix::zeros(3, 1)));
        assert_eq!(store.cached_decompositions(), 0);
        assert!(matches!(
            store.decomposition_or_matrix(reissued)?,
            DecompositionLookup::Missing { .. }
        ));
        Ok(())
    }

    #[test]
    fn test_stale_decomposition_after_delete() -> Result<(), StoreError> {
        let store = MatrixStore::new();
        let handle = store.allocate(&[1.0, 2.0], 2, 1)?;
        let (_, generation) = store.fetch_for_decomposition(handle)?;
        store.delete(handle);
        assert!(!store.store_decomposition(handle, generation, Matrix::zeros(2, 1)));
        assert_eq!(store.cached_decompositions(), 0);
        Ok(())
    }
}
