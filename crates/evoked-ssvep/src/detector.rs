use evoked_linalg::Matrix;
use evoked_score::{MatrixHandle, ScoreError, SimilarityService};
use rayon::prelude::*;

use crate::{
    config::SsvepConfig,
    error::SsvepError,
    filter::filter_columns,
    predictor::{z_score_in_place, MaxScorePredictor},
    reference::harmonic_reference,
};

/// A stimulation frequency and its stored reference.
#[derive(Debug, Clone, Copy)]
struct Target {
    frequency: f64,
    reference: MatrixHandle,
}

/// A stored matrix that is deleted when the guard goes out of scope.
struct ScopedHandle<'a> {
    service: &'a SimilarityService,
    handle: MatrixHandle,
}

impl<'a> ScopedHandle<'a> {
    fn insert(service: &'a SimilarityService, matrix: Matrix) -> Result<Self, ScoreError> {
        let handle = service.insert(matrix)?;
        Ok(Self { service, handle })
    }

    fn insert_with_qr(service: &'a SimilarityService, matrix: Matrix) -> Result<Self, ScoreError> {
        let scoped = Self::insert(service, matrix)?;
        service.precompute_qr(scoped.handle)?;
        Ok(scoped)
    }
}

impl Drop for ScopedHandle<'_> {
    fn drop(&mut self) {
        self.service.delete(self.handle);
    }
}

/// Outcome of classifying one window.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Index of the recognized frequency, if any score reached the threshold.
    pub target: Option<usize>,
    /// Raw per-target canonical correlation scores.
    pub scores: Vec<f64>,
}

/// Classifies signal windows against a set of stimulation frequencies.
///
/// One harmonic reference per frequency lives in the service's store for
/// the lifetime of the detector, with its decomposition precomputed. The
/// references are deleted when the detector is dropped.
pub struct SsvepDetector {
    service: SimilarityService,
    config: SsvepConfig,
    targets: Vec<Target>,
    predictor: MaxScorePredictor,
}

impl std::fmt::Debug for SsvepDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsvepDetector")
            .field("frequencies", &self.config.frequencies)
            .field("window_size", &self.window_size())
            .finish()
    }
}

impl SsvepDetector {
    /// Create a detector, allocating its references in `service`.
    ///
    /// # Arguments
    ///
    /// * `service` - The scoring service; its store receives the references.
    /// * `config` - The detector configuration, validated here.
    pub fn new(service: SimilarityService, config: SsvepConfig) -> Result<Self, SsvepError> {
        config.validate()?;

        let window_size = config.window_size();
        let mut detector = Self {
            predictor: MaxScorePredictor::new(config.cca_threshold),
            targets: Vec::with_capacity(config.frequencies.len()),
            service,
            config,
        };

        for &frequency in &detector.config.frequencies {
            let reference = harmonic_reference(
                frequency,
                detector.config.sampling_rate,
                window_size,
                detector.config.harmonics,
            );
            let handle = detector.service.insert(reference)?;
            // pushed before the precompute so a failure still releases it
            detector.targets.push(Target {
                frequency,
                reference: handle,
            });
            detector.service.precompute_qr(handle)?;
        }

        log::debug!(
            "ssvep detector with {} targets, window of {} samples",
            detector.targets.len(),
            window_size
        );

        Ok(detector)
    }

    /// The detector configuration.
    pub fn config(&self) -> &SsvepConfig {
        &self.config
    }

    /// Samples per window.
    pub fn window_size(&self) -> usize {
        self.config.window_size()
    }

    /// The stimulation frequencies, in target order.
    pub fn frequencies(&self) -> impl Iterator<Item = f64> + '_ {
        self.targets.iter().map(|t| t.frequency)
    }

    fn check_window(&self, window: &Matrix) -> Result<(), SsvepError> {
        let expected = self.window_size();
        if window.rows() != expected {
            return Err(SsvepError::WindowSize {
                expected,
                got: window.rows(),
            });
        }
        Ok(())
    }

    fn correlate_targets(&self, window: Matrix) -> Result<Vec<f64>, ScoreError> {
        let scoped = ScopedHandle::insert_with_qr(&self.service, window)?;
        self.targets
            .par_iter()
            .map(|t| {
                self.service
                    .canonical_correlation(&scoped.handle.into(), &t.reference.into())
            })
            .collect()
    }

    /// Per-target canonical correlation of a `window_size x channels` window.
    ///
    /// With a filter bank, each sub-band of the window is correlated
    /// separately and the squared correlations are mixed with the
    /// configured weights.
    pub fn canonical_correlations(&self, window: &Matrix) -> Result<Vec<f64>, SsvepError> {
        self.check_window(window)?;

        if self.config.filter_bank.is_empty() {
            return Ok(self.correlate_targets(window.clone())?);
        }

        let bands = self
            .config
            .filter_bank
            .par_iter()
            .map(|band| {
                let filtered = filter_columns(window, self.config.sampling_rate, band);
                self.correlate_targets(filtered)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.config.mixing.mix(&bands, self.targets.len()))
    }

    /// [`SsvepDetector::canonical_correlations`] divided by their sum.
    pub fn normalized_canonical_correlations(
        &self,
        window: &Matrix,
    ) -> Result<Vec<f64>, SsvepError> {
        Ok(normalize_by_sum(self.canonical_correlations(window)?))
    }

    /// Per-target minimum energy combination scores, divided by their sum.
    pub fn minimum_energy_combinations(&self, window: &Matrix) -> Result<Vec<f64>, SsvepError> {
        self.check_window(window)?;

        let scoped = ScopedHandle::insert(&self.service, window.clone())?;
        let scores = self
            .targets
            .par_iter()
            .map(|t| {
                self.service
                    .minimum_energy_combination(&scoped.handle.into(), &t.reference.into())
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(normalize_by_sum(scores))
    }

    /// Feature vector of a window: the z-scored normalized correlations
    /// followed by the z-scored minimum energy combination scores.
    pub fn features(&self, window: &Matrix) -> Result<Vec<f64>, SsvepError> {
        let mut cca = self.normalized_canonical_correlations(window)?;
        z_score_in_place(&mut cca);
        let mut mec = self.minimum_energy_combinations(window)?;
        z_score_in_place(&mut mec);

        cca.extend(mec);
        Ok(cca)
    }

    /// Classify a window by its highest canonical correlation.
    pub fn classify(&self, window: &Matrix) -> Result<Prediction, SsvepError> {
        let scores = self.canonical_correlations(window)?;
        let target = self.predictor.predict(&scores);
        log::trace!("ssvep scores {:?} -> {:?}", scores, target);
        Ok(Prediction { target, scores })
    }
}

impl Drop for SsvepDetector {
    fn drop(&mut self) {
        for target in &self.targets {
            self.service.delete(target.reference);
        }
    }
}

// a zero sum leaves nothing to normalize against
fn normalize_by_sum(mut values: Vec<f64>) -> Vec<f64> {
    let sum = values.iter().sum::<f64>();
    if sum == 0.0 || !sum.is_finite() {
        values.iter_mut().for_each(|v| *v = 0.0);
        return values;
    }
    values.iter_mut().for_each(|v| *v /= sum);
    values
}
