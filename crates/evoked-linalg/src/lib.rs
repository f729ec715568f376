#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Linear algebra backend trait.
pub mod backend;

/// Error types for the linear algebra kernels.
pub mod error;

/// Backend implementation on top of `faer`.
pub mod faer_backend;

/// Owned row-major matrix type.
pub mod matrix;

/// Column statistics and centering.
pub mod stats;

mod utils;

pub use backend::{LinalgBackend, SymmetricEigen};
pub use error::LinalgError;
pub use faer_backend::FaerBackend;
pub use matrix::Matrix;
pub use stats::{center_in_place, column_means};
