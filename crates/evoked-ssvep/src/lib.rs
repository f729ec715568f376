#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Detector configuration.
pub mod config;

/// Window classification against a set of stimulation frequencies.
pub mod detector;

/// Error types for the SSVEP layer.
pub mod error;

/// Ideal band-pass filtering.
pub mod filter;

/// Sub-band mixing, normalization and prediction from scores.
pub mod predictor;

/// Sine/cosine reference signals.
pub mod reference;

pub use config::SsvepConfig;
pub use detector::{Prediction, SsvepDetector};
pub use error::SsvepError;
pub use filter::{filter_columns, ideal_bandpass, BandpassFilter};
pub use predictor::{z_score_in_place, MaxScorePredictor, SubBandMixing};
pub use reference::harmonic_reference;
