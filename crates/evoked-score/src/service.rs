use std::sync::Arc;

use evoked_linalg::{FaerBackend, LinalgBackend, Matrix};
use evoked_store::{MatrixHandle, MatrixStore};

use crate::{
    cca::CcaEngine, descriptor::MatrixDescriptor, error::ScoreError, mec::MecEngine,
};

/// All scoring operations over one shared [`MatrixStore`].
///
/// This is the object a host binds to: it owns the store for its lifetime,
/// and [`SimilarityService::clear_all`] resets it to the freshly constructed
/// state.
///
/// Example:
///
/// ```
/// use evoked_score::{MatrixDescriptor, SimilarityService};
///
/// let service = SimilarityService::new();
/// let x = service.allocate(&[1.0, 2.0, 3.0], 3, 1).unwrap();
/// let y = [3.0, 2.0, 1.0];
/// let r = service
///     .canonical_correlation(&x.into(), &MatrixDescriptor::inline(&y, 3, 1).unwrap())
///     .unwrap();
/// assert!((r - 1.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct SimilarityService<B: LinalgBackend + Clone = FaerBackend> {
    store: Arc<MatrixStore>,
    cca: CcaEngine<B>,
    mec: MecEngine<B>,
}

impl SimilarityService<FaerBackend> {
    /// Create a service with an empty store and the default backend.
    pub fn new() -> Self {
        Self::with_store(Arc::new(MatrixStore::new()))
    }

    /// Create a service over an existing store.
    pub fn with_store(store: Arc<MatrixStore>) -> Self {
        Self::with_backend(store, FaerBackend)
    }
}

impl Default for SimilarityService<FaerBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: LinalgBackend + Clone> SimilarityService<B> {
    /// Create a service over `store` using a custom linear algebra backend.
    pub fn with_backend(store: Arc<MatrixStore>, backend: B) -> Self {
        Self {
            cca: CcaEngine::with_backend(Arc::clone(&store), backend.clone()),
            mec: MecEngine::with_backend(Arc::clone(&store), backend),
            store,
        }
    }

    /// The shared store.
    pub fn store(&self) -> &Arc<MatrixStore> {
        &self.store
    }

    /// The canonical correlation engine.
    pub fn cca(&self) -> &CcaEngine<B> {
        &self.cca
    }

    /// The minimum energy combination engine.
    pub fn mec(&self) -> &MecEngine<B> {
        &self.mec
    }

    /// Copy a row-major buffer into the store.
    pub fn allocate(
        &self,
        data: &[f64],
        rows: usize,
        cols: usize,
    ) -> Result<MatrixHandle, ScoreError> {
        Ok(self.store.allocate(data, rows, cols)?)
    }

    /// Move an owned matrix into the store.
    pub fn insert(&self, matrix: Matrix) -> Result<MatrixHandle, ScoreError> {
        Ok(self.store.insert(matrix)?)
    }

    /// Return a copy of a stored matrix.
    pub fn fetch(&self, handle: MatrixHandle) -> Result<Matrix, ScoreError> {
        Ok(self.store.fetch(handle)?)
    }

    /// Delete a stored matrix; deleting an absent handle is not an error.
    pub fn delete(&self, handle: MatrixHandle) -> bool {
        self.store.delete(handle)
    }

    /// Delete every stored matrix and restart handle numbering.
    ///
    /// Handles obtained before the call must not be used afterwards.
    pub fn clear_all(&self) {
        self.store.clear();
    }

    /// Force (re)computation of the cached basis of a stored matrix.
    pub fn precompute_qr(&self, handle: MatrixHandle) -> Result<(), ScoreError> {
        self.cca.precompute_qr(handle)
    }

    /// The largest canonical correlation between `x` and `y`, in `[0, 1]`.
    pub fn canonical_correlation(
        &self,
        x: &MatrixDescriptor<'_>,
        y: &MatrixDescriptor<'_>,
    ) -> Result<f64, ScoreError> {
        self.cca.canonical_correlation(x, y)
    }

    /// All canonical correlations between `x` and `y`, descending.
    pub fn canonical_correlations(
        &self,
        x: &MatrixDescriptor<'_>,
        y: &MatrixDescriptor<'_>,
    ) -> Result<Vec<f64>, ScoreError> {
        self.cca.canonical_correlations(x, y)
    }

    /// The minimum energy combination score of `signal` against `reference`.
    pub fn minimum_energy_combination(
        &self,
        signal: &MatrixDescriptor<'_>,
        reference: &MatrixDescriptor<'_>,
    ) -> Result<f64, ScoreError> {
        self.mec.minimum_energy_combination(signal, reference)
    }
}
