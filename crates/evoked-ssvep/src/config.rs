use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{error::SsvepError, filter::BandpassFilter, predictor::SubBandMixing};

/// Configuration of an [`crate::SsvepDetector`].
///
/// Example:
///
/// ```
/// use evoked_ssvep::SsvepConfig;
///
/// let config = SsvepConfig::from_json_str(
///     r#"{
///         "sampling_rate": 250.0,
///         "trial_duration_ms": 2000,
///         "harmonics": 2,
///         "frequencies": [8.0, 10.0, 12.0],
///         "cca_threshold": 0.2
///     }"#,
/// )
/// .unwrap();
/// assert_eq!(config.window_size(), 500);
/// assert!(config.filter_bank.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SsvepConfig {
    /// Sampling rate of the windows, in Hz.
    pub sampling_rate: f64,
    /// Duration of one trial window, in milliseconds.
    pub trial_duration_ms: u32,
    /// Harmonics per reference, including the fundamental.
    pub harmonics: usize,
    /// One stimulation frequency per target, in Hz.
    pub frequencies: Vec<f64>,
    /// Minimum canonical correlation for a target to be predicted.
    pub cca_threshold: f64,
    /// Sub-bands of the filter-bank variant; empty for plain CCA.
    #[serde(default)]
    pub filter_bank: Vec<BandpassFilter>,
    /// Weights of the filter-bank sub-bands.
    #[serde(default)]
    pub mixing: SubBandMixing,
}

impl Default for SsvepConfig {
    fn default() -> Self {
        Self {
            sampling_rate: 250.0,
            trial_duration_ms: 2000,
            harmonics: 3,
            frequencies: vec![8.0, 10.0, 12.0, 15.0],
            cca_threshold: 0.0,
            filter_bank: Vec::new(),
            mixing: SubBandMixing::default(),
        }
    }
}

impl SsvepConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, SsvepError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SsvepError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Samples per window, `floor(sampling_rate * trial_duration_ms / 1000)`.
    pub fn window_size(&self) -> usize {
        (self.sampling_rate * self.trial_duration_ms as f64 / 1000.0).floor() as usize
    }

    /// Check that the configuration can drive a detector.
    pub fn validate(&self) -> Result<(), SsvepError> {
        let invalid = |msg: String| -> Result<(), SsvepError> { Err(SsvepError::InvalidConfig(msg)) };

        if !(self.sampling_rate.is_finite() && self.sampling_rate > 0.0) {
            return invalid(format!("sampling rate {} is not positive", self.sampling_rate));
        }
        if self.trial_duration_ms == 0 {
            return invalid("trial duration must be positive".to_string());
        }
        if self.harmonics == 0 {
            return invalid("at least one harmonic is required".to_string());
        }
        if self.frequencies.is_empty() {
            return invalid("at least one stimulation frequency is required".to_string());
        }
        if let Some(f) = self
            .frequencies
            .iter()
            .find(|f| !(f.is_finite() && **f > 0.0))
        {
            return invalid(format!("stimulation frequency {f} is not positive"));
        }
        if let Some(filter) = self
            .filter_bank
            .iter()
            .find(|b| !(b.low_cutoff >= 0.0 && b.low_cutoff <= b.high_cutoff))
        {
            return invalid(format!("sub-band {filter} is empty"));
        }

        let window = self.window_size();
        if window < 2 * self.harmonics {
            return invalid(format!(
                "window of {window} samples is shorter than the {} reference columns",
                2 * self.harmonics
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() -> Result<(), SsvepError> {
        let config = SsvepConfig::default();
        config.validate()?;
        assert_eq!(config.window_size(), 500);
        Ok(())
    }

    #[test]
    fn test_window_size_truncates() {
        let config = SsvepConfig {
            sampling_rate: 256.0,
            trial_duration_ms: 1500,
            ..Default::default()
        };
        assert_eq!(config.window_size(), 384);

        let config = SsvepConfig {
            sampling_rate: 100.0,
            trial_duration_ms: 1234,
            ..Default::default()
        };
        assert_eq!(config.window_size(), 123);
    }

    #[test]
    fn test_rejects_invalid() {
        let cases = [
            SsvepConfig {
                frequencies: vec![],
                ..Default::default()
            },
            SsvepConfig {
                harmonics: 0,
                ..Default::default()
            },
            SsvepConfig {
                trial_duration_ms: 0,
                ..Default::default()
            },
            SsvepConfig {
                sampling_rate: -1.0,
                ..Default::default()
            },
            SsvepConfig {
                sampling_rate: 10.0,
                trial_duration_ms: 200,
                harmonics: 2,
                ..Default::default()
            },
            SsvepConfig {
                filter_bank: vec![BandpassFilter::new(30.0, 10.0)],
                ..Default::default()
            },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(SsvepError::InvalidConfig(_))),
                "{config:?} was accepted"
            );
        }
    }

    #[test]
    fn test_json_with_filter_bank() -> Result<(), SsvepError> {
        let config = SsvepConfig::from_json_str(
            r#"{
                "sampling_rate": 250.0,
                "trial_duration_ms": 1000,
                "harmonics": 2,
                "frequencies": [8.0, 12.0],
                "cca_threshold": 0.1,
                "filter_bank": [
                    {"low_cutoff": 6.0, "high_cutoff": 90.0},
                    {"low_cutoff": 14.0, "high_cutoff": 90.0}
                ],
                "mixing": {"a": 1.0, "b": 0.0}
            }"#,
        )?;
        assert_eq!(config.filter_bank.len(), 2);
        assert_eq!(config.mixing, SubBandMixing { a: 1.0, b: 0.0 });
        Ok(())
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SsvepConfig::from_json_str("{\"sampling_rate\": 250.0"),
            Err(SsvepError::Json(_))
        ));
    }
}
