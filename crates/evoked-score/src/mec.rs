use std::sync::Arc;

use evoked_linalg::{FaerBackend, LinalgBackend, LinalgError, Matrix};
use evoked_store::MatrixStore;

use crate::{descriptor::MatrixDescriptor, error::ScoreError};

/// Minimum energy combination between a signal and a reference.
#[derive(Debug, Clone)]
pub struct MecEngine<B: LinalgBackend = FaerBackend> {
    store: Arc<MatrixStore>,
    backend: B,
}

impl MecEngine<FaerBackend> {
    /// Create an engine over `store` using the default backend.
    pub fn new(store: Arc<MatrixStore>) -> Self {
        Self::with_backend(store, FaerBackend)
    }
}

impl<B: LinalgBackend> MecEngine<B> {
    /// Create an engine over `store` using a custom linear algebra backend.
    pub fn with_backend(store: Arc<MatrixStore>, backend: B) -> Self {
        Self { store, backend }
    }

    /// Score how much reference energy the lowest-noise combinations of
    /// `signal` capture.
    ///
    /// # Arguments
    ///
    /// * `signal` - The signal `Y` with samples as rows and channels as columns.
    /// * `reference` - The reference `X`, row-aligned with the signal.
    ///
    /// # Returns
    ///
    /// A non-negative score, unbounded above.
    ///
    /// # Errors
    ///
    /// [`ScoreError::DimensionMismatch`] for misaligned rows,
    /// [`ScoreError::DegenerateInput`] when the reference columns are linearly
    /// dependent or the residual energy is not positive definite.
    pub fn minimum_energy_combination(
        &self,
        signal: &MatrixDescriptor<'_>,
        reference: &MatrixDescriptor<'_>,
    ) -> Result<f64, ScoreError> {
        let y = signal.resolve(&self.store)?;
        let x = reference.resolve(&self.store)?;
        minimum_energy_combination_power(&self.backend, &y, &x)
    }
}

/// Minimum energy combination score of signal `y` against reference `x`.
///
/// 1. Remove the part of `y` explained by the columns of `x`:
///    `Y1 = Y - X (X^T X)^-1 X^T Y`.
/// 2. Eigendecompose the residual energy `Y1^T Y1`, ascending.
/// 3. Whiten: `W[:, i] = v_i / sqrt(lambda_i)`.
/// 4. Combine: `S = Y W`.
/// 5. Average `(X_k^T S_l)^2` over all reference/combination column pairs.
pub fn minimum_energy_combination_power<B: LinalgBackend>(
    backend: &B,
    y: &Matrix,
    x: &Matrix,
) -> Result<f64, ScoreError> {
    if y.rows() != x.rows() {
        return Err(ScoreError::DimensionMismatch {
            left: y.rows(),
            right: x.rows(),
        });
    }

    if y.cols() == 0 || x.cols() == 0 {
        return Err(ScoreError::DegenerateInput(format!(
            "empty operand: signal has {} columns, reference has {}",
            y.cols(),
            x.cols()
        )));
    }

    let xtx = backend.transpose_matmul(x, x)?;
    let xtx_inv = backend.invert(&xtx).map_err(|err| match err {
        LinalgError::SingularMatrix(rcond) => ScoreError::DegenerateInput(format!(
            "reference columns are linearly dependent (rcond {rcond:e})"
        )),
        other => other.into(),
    })?;

    // project the signal onto the reference column space and remove it
    let xty = backend.transpose_matmul(x, y)?;
    let projection = backend.matmul(x, &backend.matmul(&xtx_inv, &xty)?)?;
    let residual = Matrix::from_fn(y.rows(), y.cols(), |r, c| y[(r, c)] - projection[(r, c)]);

    let energy = backend.transpose_matmul(&residual, &residual)?;
    let eig = backend.symmetric_eigen(&energy)?;

    // eigenvalues are judged against the total signal energy, so a residual
    // that is only rounding noise counts as zero
    let lambda_max = eig.eigenvalues.last().copied().unwrap_or(0.0);
    let signal_energy = y.as_slice().iter().map(|v| v * v).sum::<f64>();
    let tol = lambda_max.max(signal_energy) * eig.eigenvalues.len() as f64 * f64::EPSILON;
    if let Some(lambda) = eig.eigenvalues.iter().find(|&&l| !(l > tol)) {
        return Err(ScoreError::DegenerateInput(format!(
            "residual energy eigenvalue {lambda:e} is not positive"
        )));
    }

    let n = eig.eigenvalues.len();
    let whitening = Matrix::from_fn(n, n, |r, c| {
        eig.eigenvectors[(r, c)] / eig.eigenvalues[c].sqrt()
    });
    let combined = backend.matmul(y, &whitening)?;

    let inner = backend.transpose_matmul(x, &combined)?;
    let power = inner.as_slice().iter().map(|v| v * v).sum::<f64>();

    log::trace!(
        "mec power {} over {} combinations and {} references",
        power,
        combined.cols(),
        x.cols()
    );

    Ok(power / (combined.cols() as f64 * x.cols() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_column() -> Result<(), ScoreError> {
        // Y1 = [0.5, -0.5, 1], |Y1|^2 = 1.5, (X . Y)^2 = 1
        let y = Matrix::from_columns(&[vec![1.0, 0.0, 1.0]])?;
        let x = Matrix::from_columns(&[vec![1.0, 1.0, 0.0]])?;
        let p = minimum_energy_combination_power(&FaerBackend, &y, &x)?;
        assert_relative_eq!(p, 1.0 / 1.5, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_dependent_reference() -> Result<(), ScoreError> {
        let y = Matrix::from_columns(&[vec![1.0, 0.0, 1.0, 2.0]])?;
        let x = Matrix::from_columns(&[vec![1.0, 2.0, 3.0, 4.0], vec![2.0, 4.0, 6.0, 8.0]])?;
        let res = minimum_energy_combination_power(&FaerBackend, &y, &x);
        assert!(matches!(res, Err(ScoreError::DegenerateInput(_))));
        Ok(())
    }

    #[test]
    fn test_signal_inside_reference_span() -> Result<(), ScoreError> {
        // the signal is fully explained by the reference, no residual energy
        let x = Matrix::from_columns(&[vec![1.0, 2.0, 0.0, 1.0], vec![0.0, 1.0, 1.0, 3.0]])?;
        let y = Matrix::from_columns(&[vec![1.0, 3.0, 1.0, 4.0]])?;
        let res = minimum_energy_combination_power(&FaerBackend, &y, &x);
        assert!(matches!(res, Err(ScoreError::DegenerateInput(_))));
        Ok(())
    }

    #[test]
    fn test_empty_operand() {
        let y = Matrix::zeros(3, 0);
        let x = Matrix::zeros(3, 1);
        let res = minimum_energy_combination_power(&FaerBackend, &y, &x);
        assert!(matches!(res, Err(ScoreError::DegenerateInput(_))));
        let res = minimum_energy_combination_power(&FaerBackend, &x, &y);
        assert!(matches!(res, Err(ScoreError::DegenerateInput(_))));
    }

    #[test]
    fn test_row_mismatch() -> Result<(), ScoreError> {
        let y = Matrix::from_columns(&[vec![1.0, 0.0, 1.0]])?;
        let x = Matrix::from_columns(&[vec![1.0, 1.0]])?;
        assert_eq!(
            minimum_energy_combination_power(&FaerBackend, &y, &x),
            Err(ScoreError::DimensionMismatch { left: 3, right: 2 })
        );
        Ok(())
    }

    #[test]
    fn test_engine_resolves_descriptors() -> Result<(), ScoreError> {
        let store = Arc::new(MatrixStore::new());
        let mec = MecEngine::new(Arc::clone(&store));
        let y = store.allocate(&[1.0, 0.0, 1.0], 3, 1)?;
        let x = [1.0, 1.0, 0.0];
        let p = mec.minimum_energy_combination(&y.into(), &MatrixDescriptor::inline(&x, 3, 1)?)?;
        assert_relative_eq!(p, 1.0 / 1.5, epsilon = 1e-12);
        Ok(())
    }
}
