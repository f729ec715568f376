use evoked_score::ScoreError;

/// An error type for the SSVEP layer.
#[derive(thiserror::Error, Debug)]
pub enum SsvepError {
    /// The configuration cannot drive a detector.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A window does not have the configured number of samples.
    #[error("Window has {got} samples, expected {expected}")]
    WindowSize {
        /// Samples per window from the configuration.
        expected: usize,
        /// Samples in the given window.
        got: usize,
    },

    /// Scoring failed.
    #[error(transparent)]
    Score(#[from] ScoreError),

    /// The configuration file is not valid JSON.
    #[error("Failed to parse configuration")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("error reading file")]
    Io(#[from] std::io::Error),
}
