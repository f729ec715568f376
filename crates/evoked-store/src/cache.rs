use std::collections::HashMap;

use evoked_linalg::Matrix;

use crate::handle::{Generation, MatrixHandle};

/// Centered orthonormal basis computed from one stored matrix.
#[derive(Debug, Clone)]
pub(crate) struct CachedDecomposition {
    pub factor: Matrix,
    pub generation: Generation,
}

/// Handle to decomposition map, invalidated together with the repository.
///
/// Not synchronized; [`crate::MatrixStore`] guards it.
#[derive(Debug, Default)]
pub(crate) struct DecompositionCache {
    entries: HashMap<MatrixHandle, CachedDecomposition>,
}

impl DecompositionCache {
    /// The factor cached for `handle`, if it was computed from `generation`.
    pub fn get(&self, handle: MatrixHandle, generation: Generation) -> Option<&Matrix> {
        self.entries
            .get(&handle)
            .filter(|entry| entry.generation == generation)
            .map(|entry| &entry.factor)
    }

    /// Last write wins.
    pub fn insert(&mut self, handle: MatrixHandle, generation: Generation, factor: Matrix) {
        self.entries
            .insert(handle, CachedDecomposition { factor, generation });
    }

    pub fn remove(&mut self, handle: MatrixHandle) {
        self.entries.remove(&handle);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
