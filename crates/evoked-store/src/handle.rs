use std::{fmt, num::NonZeroU64};

/// Opaque reference to a matrix owned by a [`crate::MatrixStore`].
///
/// Handles are positive; the value `0` is reserved and never issued. A
/// handle is only unique between two calls to [`crate::MatrixStore::clear`],
/// since the counter restarts after a clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatrixHandle(NonZeroU64);

impl MatrixHandle {
    /// Wrap a raw id, returning `None` for the reserved value `0`.
    pub const fn new(id: u64) -> Option<Self> {
        match NonZeroU64::new(id) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    /// The raw id.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for MatrixHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<MatrixHandle> for u64 {
    fn from(handle: MatrixHandle) -> Self {
        handle.get()
    }
}

/// Stamp identifying one particular stored matrix.
///
/// Unlike handles, generations are never reused, not even after a clear, so
/// a decomposition computed from a stored matrix can be matched against the
/// entry that is live when the result is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Generation(pub(crate) u64);
