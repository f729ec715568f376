use serde::{Deserialize, Serialize};

/// Weights of the filter-bank sub-bands.
///
/// Sub-band `f` (zero based) is weighted `(f + 1)^-a + b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubBandMixing {
    /// Decay of the weights over the sub-bands.
    pub a: f64,
    /// Constant offset added to every weight.
    pub b: f64,
}

impl Default for SubBandMixing {
    fn default() -> Self {
        Self { a: 1.25, b: 0.25 }
    }
}

impl SubBandMixing {
    /// The weight of sub-band `index`.
    pub fn weight(&self, index: usize) -> f64 {
        ((index + 1) as f64).powf(-self.a) + self.b
    }

    /// Mix per-band correlations into one score per target.
    ///
    /// `bands[f][h]` is the correlation of sub-band `f` with target `h`; the
    /// score of target `h` is the weighted sum of the squared correlations.
    pub fn mix(&self, bands: &[Vec<f64>], targets: usize) -> Vec<f64> {
        let mut scores = vec![0.0; targets];
        for (f, band) in bands.iter().enumerate() {
            let w = self.weight(f);
            for (score, rho) in scores.iter_mut().zip(band) {
                *score += w * rho * rho;
            }
        }
        scores
    }
}

/// Picks the target with the highest score at or above a threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxScorePredictor {
    /// Scores below this value never win.
    pub threshold: f64,
}

impl MaxScorePredictor {
    /// Create a predictor with the given threshold.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// The index of the winning score, or `None` if no score reaches the
    /// threshold. Ties go to the lowest index.
    pub fn predict(&self, scores: &[f64]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &score) in scores.iter().enumerate() {
            if score < self.threshold || score.is_nan() {
                continue;
            }
            match best {
                Some((_, max)) if score <= max => {}
                _ => best = Some((i, score)),
            }
        }
        best.map(|(i, _)| i)
    }
}

/// Standardize `values` to zero mean and unit sample standard deviation.
///
/// Values that cannot be standardized, e.g. when all inputs are equal or
/// there is a single input, become `0`.
pub fn z_score_in_place(values: &mut [f64]) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = variance.sqrt();

    for v in values.iter_mut() {
        let z = (*v - mean) / std;
        *v = if z.is_nan() { 0.0 } else { z };
    }
}
