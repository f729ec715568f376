use std::collections::HashMap;

use evoked_linalg::Matrix;

use crate::handle::{Generation, MatrixHandle};

/// A matrix owned by the repository.
#[derive(Debug, Clone)]
pub(crate) struct StoredMatrix {
    pub matrix: Matrix,
    pub generation: Generation,
}

/// Handle to matrix map with monotonic id assignment.
///
/// Not synchronized; [`crate::MatrixStore`] guards it.
#[derive(Debug, Default)]
pub(crate) struct MatrixRepository {
    last_id: u64,
    next_generation: u64,
    entries: HashMap<MatrixHandle, StoredMatrix>,
}

impl MatrixRepository {
    /// Take ownership of `matrix` and register it under a fresh handle.
    pub fn insert(&mut self, matrix: Matrix) -> (MatrixHandle, Generation) {
        let handle = self.next_free_handle();
        let generation = Generation(self.next_generation);
        self.next_generation = self.next_generation.wrapping_add(1);
        self.entries.insert(handle, StoredMatrix { matrix, generation });
        (handle, generation)
    }

    pub fn get(&self, handle: MatrixHandle) -> Option<&StoredMatrix> {
        self.entries.get(&handle)
    }

    pub fn contains(&self, handle: MatrixHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn remove(&mut self, handle: MatrixHandle) -> bool {
        self.entries.remove(&handle).is_some()
    }

    /// Drop every matrix and restart the id counter.
    ///
    /// The generation counter keeps running.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.last_id = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // Assumes the number of live handles never approaches the size of the id
    // space, otherwise this loop would not terminate.
    fn next_free_handle(&mut self) -> MatrixHandle {
        loop {
            self.last_id = self.last_id.wrapping_add(1);
            // wrapped around onto the reserved id
            let Some(handle) = MatrixHandle::new(self.last_id) else {
                continue;
            };
            if !self.entries.contains_key(&handle) {
                return handle;
            }
        }
    }

    #[cfg(test)]
    pub fn set_last_id(&mut self, last_id: u64) {
        self.last_id = last_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(value: f64) -> Matrix {
        Matrix::from_fn(2, 1, |_, _| value)
    }

    #[test]
    fn test_ids_increase() {
        let mut repo = MatrixRepository::default();
        let (a, _) = repo.insert(matrix(1.0));
        let (b, _) = repo.insert(matrix(2.0));
        let (c, _) = repo.insert(matrix(3.0));
        assert_eq!((a.get(), b.get(), c.get()), (1, 2, 3));
        assert_eq!(repo.len(), 3);
    }

    #[test]
    fn test_ids_not_reused_after_remove() {
        let mut repo = MatrixRepository::default();
        let (a, _) = repo.insert(matrix(1.0));
        assert!(repo.remove(a));
        assert!(!repo.remove(a));
        let (b, _) = repo.insert(matrix(2.0));
        assert_eq!(b.get(), 2);
    }

    #[test]
    fn test_clear_resets_ids_not_generations() {
        let mut repo = MatrixRepository::default();
        let (a, gen_a) = repo.insert(matrix(1.0));
        repo.clear();
        assert_eq!(repo.len(), 0);
        let (b, gen_b) = repo.insert(matrix(2.0));
        assert_eq!(a, b);
        assert_ne!(gen_a, gen_b);
    }

    #[test]
    fn test_wraparound_skips_zero_and_live_ids() {
        let mut repo = MatrixRepository::default();
        let (first, _) = repo.insert(matrix(1.0));
        assert_eq!(first.get(), 1);

        repo.set_last_id(u64::MAX - 1);
        let (last, _) = repo.insert(matrix(2.0));
        assert_eq!(last.get(), u64::MAX);

        // wraps past 0 and past the live id 1
        let (wrapped, _) = repo.insert(matrix(3.0));
        assert_eq!(wrapped.get(), 2);
        assert!(repo.contains(first));
        assert_eq!(repo.get(first).map(|s| s.matrix[(0, 0)]), Some(1.0));
    }
}
