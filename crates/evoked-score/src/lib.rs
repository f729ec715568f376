#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Canonical correlation analysis.
pub mod cca;

/// Matrix descriptors accepted by the engines.
pub mod descriptor;

/// Error types for the scoring engines.
pub mod error;

/// Minimum energy combination.
pub mod mec;

/// Facade bundling the store and both engines.
pub mod service;

pub use cca::CcaEngine;
pub use descriptor::{InlineMatrix, MatrixDescriptor};
pub use error::ScoreError;
pub use mec::{minimum_energy_combination_power, MecEngine};
pub use service::SimilarityService;

pub use evoked_linalg::{FaerBackend, LinalgBackend, Matrix};
pub use evoked_store::{MatrixHandle, MatrixStore};
