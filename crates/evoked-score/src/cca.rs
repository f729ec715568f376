use std::sync::Arc;

use evoked_linalg::{center_in_place, FaerBackend, LinalgBackend, Matrix};
use evoked_store::{DecompositionLookup, Generation, MatrixHandle, MatrixStore};

use crate::{
    descriptor::{ensure_finite, MatrixDescriptor},
    error::ScoreError,
};

/// Canonical correlation between two multichannel signals.
///
/// Each operand is reduced to an orthonormal basis of its centered column
/// space (a rank-aware economy QR); the canonical correlations are then the
/// singular values of `Qx^T * Qy`. Bases of stored matrices are cached in
/// the [`MatrixStore`] and reused by later calls.
#[derive(Debug, Clone)]
pub struct CcaEngine<B: LinalgBackend = FaerBackend> {
    store: Arc<MatrixStore>,
    backend: B,
}

impl CcaEngine<FaerBackend> {
    /// Create an engine over `store` using the default backend.
    pub fn new(store: Arc<MatrixStore>) -> Self {
        Self::with_backend(store, FaerBackend)
    }
}

impl<B: LinalgBackend> CcaEngine<B> {
    /// Create an engine over `store` using a custom linear algebra backend.
    pub fn with_backend(store: Arc<MatrixStore>, backend: B) -> Self {
        Self { store, backend }
    }

    /// The store the engine resolves handles against.
    pub fn store(&self) -> &Arc<MatrixStore> {
        &self.store
    }

    /// Center `matrix` and return an orthonormal basis of its column space.
    pub fn orthonormal_basis(&self, mut matrix: Matrix) -> Matrix {
        center_in_place(&mut matrix);
        self.backend.economy_qr(&matrix)
    }

    /// Compute the basis of a stored matrix and write it into the cache,
    /// replacing any existing entry.
    ///
    /// Used for reference matrices that will be compared many times.
    ///
    /// # Errors
    ///
    /// [`ScoreError::NotFound`] if `handle` is not live, including when it
    /// was deleted while the basis was being computed.
    pub fn precompute_qr(&self, handle: MatrixHandle) -> Result<(), ScoreError> {
        let (matrix, generation) = self.store.fetch_for_decomposition(handle)?;
        ensure_finite(&matrix)?;
        let basis = self.orthonormal_basis(matrix);
        if !self.cache_basis(handle, generation, basis) {
            return Err(ScoreError::NotFound(handle));
        }
        Ok(())
    }

    fn resolve_basis(&self, desc: &MatrixDescriptor<'_>) -> Result<Matrix, ScoreError> {
        let handle = match desc {
            MatrixDescriptor::Stored(handle) => *handle,
            MatrixDescriptor::Inline(_) => {
                return Ok(self.orthonormal_basis(desc.resolve(&self.store)?));
            }
        };

        match self.store.decomposition_or_matrix(handle)? {
            DecompositionLookup::Cached(basis) => Ok(basis),
            DecompositionLookup::Missing { matrix, generation } => {
                ensure_finite(&matrix)?;
                let basis = self.orthonormal_basis(matrix);
                // another thread may have raced us here; both computed the same basis
                self.cache_basis(handle, generation, basis.clone());
                Ok(basis)
            }
        }
    }

    // Returns whether the basis was cached; a replaced matrix keeps no entry.
    fn cache_basis(&self, handle: MatrixHandle, generation: Generation, basis: Matrix) -> bool {
        let cached = self.store.store_decomposition(handle, generation, basis);
        if !cached {
            log::trace!("basis of {} not cached, matrix was replaced", handle);
        }
        cached
    }

    /// All canonical correlations between `x` and `y`, in descending order.
    ///
    /// Each value is clamped into `[0, 1]`.
    ///
    /// # Errors
    ///
    /// [`ScoreError::DimensionMismatch`] if the operands have different row
    /// counts, [`ScoreError::NotFound`] for a handle that is not live and
    /// [`ScoreError::DegenerateInput`] when an operand is constant over all
    /// rows, which includes every single-row operand.
    pub fn canonical_correlations(
        &self,
        x: &MatrixDescriptor<'_>,
        y: &MatrixDescriptor<'_>,
    ) -> Result<Vec<f64>, ScoreError> {
        let qx = self.resolve_basis(x)?;
        let qy = self.resolve_basis(y)?;

        if qx.rows() != qy.rows() {
            return Err(ScoreError::DimensionMismatch {
                left: qx.rows(),
                right: qy.rows(),
            });
        }

        if qx.cols() == 0 || qy.cols() == 0 {
            return Err(ScoreError::DegenerateInput(
                "operand is constant over all rows, no canonical directions".to_string(),
            ));
        }

        let cross = self.backend.transpose_matmul(&qx, &qy)?;
        let correlations = self
            .backend
            .singular_values(&cross)
            .into_iter()
            .map(|s| s.clamp(0.0, 1.0))
            .collect();

        Ok(correlations)
    }

    /// The largest canonical correlation between `x` and `y`, in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Same as [`CcaEngine::canonical_correlations`].
    pub fn canonical_correlation(
        &self,
        x: &MatrixDescriptor<'_>,
        y: &MatrixDescriptor<'_>,
    ) -> Result<f64, ScoreError> {
        let correlations = self.canonical_correlations(x, y)?;
        correlations.first().copied().ok_or_else(|| {
            ScoreError::DegenerateInput("no canonical directions".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn engine() -> CcaEngine {
        CcaEngine::new(Arc::new(MatrixStore::new()))
    }

    #[test]
    fn test_identical_columns() -> Result<(), ScoreError> {
        let cca = engine();
        let x = cca.store().allocate(&[1.0, 2.0, 3.0], 3, 1)?;
        let y = cca.store().allocate(&[1.0, 2.0, 3.0], 3, 1)?;
        let r = cca.canonical_correlation(&x.into(), &y.into())?;
        assert_relative_eq!(r, 1.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_reversed_columns() -> Result<(), ScoreError> {
        let cca = engine();
        let x = cca.store().allocate(&[1.0, 2.0, 3.0], 3, 1)?;
        let y = cca.store().allocate(&[3.0, 2.0, 1.0], 3, 1)?;
        let r = cca.canonical_correlation(&x.into(), &y.into())?;
        assert_relative_eq!(r, 1.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_known_correlation() -> Result<(), ScoreError> {
        // pearson correlation of these two columns is 0.8
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 1.0, 4.0, 3.0, 5.0];
        let cca = engine();
        let r = cca.canonical_correlation(
            &MatrixDescriptor::inline(&x, 5, 1)?,
            &MatrixDescriptor::inline(&y, 5, 1)?,
        )?;
        assert_relative_eq!(r, 0.8, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_row_mismatch() -> Result<(), ScoreError> {
        let cca = engine();
        let x = cca.store().allocate(&[1.0, 2.0, 3.0], 3, 1)?;
        let y = [1.0, 2.0, 3.0, 4.0];
        let res = cca.canonical_correlation(&x.into(), &MatrixDescriptor::inline(&y, 4, 1)?);
        assert_eq!(res, Err(ScoreError::DimensionMismatch { left: 3, right: 4 }));
        Ok(())
    }

    #[test]
    fn test_constant_operand() -> Result<(), ScoreError> {
        let cca = engine();
        let x = [5.0, 5.0, 5.0];
        let y = [1.0, 2.0, 4.0];
        let x = MatrixDescriptor::inline(&x, 3, 1)?;
        let y = MatrixDescriptor::inline(&y, 3, 1)?;
        assert!(matches!(
            cca.canonical_correlation(&x, &y),
            Err(ScoreError::DegenerateInput(_))
        ));
        assert!(matches!(
            cca.canonical_correlations(&y, &x),
            Err(ScoreError::DegenerateInput(_))
        ));
        Ok(())
    }

    #[test]
    fn test_single_row_operand() -> Result<(), ScoreError> {
        let cca = engine();
        let row = cca.store().allocate(&[1.0, 2.0, 3.0], 1, 3)?;
        assert!(matches!(
            cca.canonical_correlation(&row.into(), &row.into()),
            Err(ScoreError::DegenerateInput(_))
        ));

        let scalar = cca.store().allocate(&[5.0], 1, 1)?;
        assert!(matches!(
            cca.canonical_correlation(&scalar.into(), &scalar.into()),
            Err(ScoreError::DegenerateInput(_))
        ));
        Ok(())
    }

    #[test]
    fn test_basis_of_replaced_matrix_not_cached() -> Result<(), ScoreError> {
        let cca = engine();
        let handle = cca.store().allocate(&[1.0, 2.0, 3.0], 3, 1)?;
        let (matrix, generation) = cca.store().fetch_for_decomposition(handle)?;
        let basis = cca.orthonormal_basis(matrix);

        cca.store().clear();
        let reissued = cca.store().allocate(&[4.0, 1.0, 0.0, 2.0], 4, 1)?;
        assert_eq!(reissued, handle);

        assert!(!cca.cache_basis(handle, generation, basis));
        assert_eq!(cca.store().cached_decompositions(), 0);

        // the next score computes the basis of the new matrix
        let y = [1.0, 0.0, 2.0, 5.0];
        let r = cca.canonical_correlation(&reissued.into(), &MatrixDescriptor::inline(&y, 4, 1)?)?;
        assert!((0.0..=1.0).contains(&r));
        assert_eq!(cca.store().cached_decompositions(), 1);
        Ok(())
    }

    #[test]
    fn test_cache_only_for_stored() -> Result<(), ScoreError> {
        let cca = engine();
        let x = cca.store().allocate(&[1.0, 2.0, 3.0, 5.0], 4, 1)?;
        let y = [2.0, 1.0, 0.0, 3.0];
        cca.canonical_correlation(&x.into(), &MatrixDescriptor::inline(&y, 4, 1)?)?;
        assert_eq!(cca.store().cached_decompositions(), 1);
        Ok(())
    }

    #[test]
    fn test_precompute_missing_handle() {
        let cca = engine();
        let handle = MatrixHandle::new(3).unwrap();
        assert_eq!(cca.precompute_qr(handle), Err(ScoreError::NotFound(handle)));
    }
}
