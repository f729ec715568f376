#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod cache;
mod repository;

/// Error types for the matrix store.
pub mod error;

/// Matrix handles and generation stamps.
pub mod handle;

/// The shared matrix store.
pub mod store;

pub use error::StoreError;
pub use handle::{Generation, MatrixHandle};
pub use store::{DecompositionLookup, MatrixStore};
