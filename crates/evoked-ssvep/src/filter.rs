use std::sync::Arc;

use evoked_linalg::Matrix;
use rustfft::{num_complex::Complex64, Fft, FftPlanner};
use serde::{Deserialize, Serialize};

/// Pass band of an ideal filter, in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandpassFilter {
    /// Lowest frequency kept.
    pub low_cutoff: f64,
    /// Highest frequency kept.
    pub high_cutoff: f64,
}

impl BandpassFilter {
    /// Create a filter keeping `[low_cutoff, high_cutoff]`.
    pub fn new(low_cutoff: f64, high_cutoff: f64) -> Self {
        Self {
            low_cutoff,
            high_cutoff,
        }
    }

    /// Whether `frequency` lies in the pass band.
    pub fn passes(&self, frequency: f64) -> bool {
        frequency >= self.low_cutoff && frequency <= self.high_cutoff
    }
}

impl std::fmt::Display for BandpassFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}~{}Hz", self.low_cutoff, self.high_cutoff)
    }
}

struct BandpassPlan {
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    len: usize,
}

impl BandpassPlan {
    fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            forward: planner.plan_fft_forward(len),
            inverse: planner.plan_fft_inverse(len),
            len,
        }
    }

    fn apply(
        &self,
        samples: impl Iterator<Item = f64>,
        sampling_rate: f64,
        filter: &BandpassFilter,
    ) -> Vec<f64> {
        let mut buffer = samples
            .map(|v| Complex64::new(v, 0.0))
            .collect::<Vec<_>>();
        self.forward.process(&mut buffer);

        let n = self.len;
        let bin_width = sampling_rate / n as f64;
        for (k, bin) in buffer.iter_mut().enumerate() {
            // bins above n/2 hold the negative frequencies
            let frequency = k.min(n - k) as f64 * bin_width;
            if !filter.passes(frequency) {
                *bin = Complex64::new(0.0, 0.0);
            }
        }

        self.inverse.process(&mut buffer);
        let scale = 1.0 / n as f64;
        buffer.iter().map(|c| c.re * scale).collect()
    }
}

/// Zero every spectral component of `signal` outside the pass band.
///
/// # Arguments
///
/// * `signal` - The samples, uniformly spaced.
/// * `sampling_rate` - The sampling rate in Hz.
/// * `filter` - The pass band.
///
/// # Returns
///
/// The filtered samples, as many as the input.
pub fn ideal_bandpass(signal: &[f64], sampling_rate: f64, filter: &BandpassFilter) -> Vec<f64> {
    if signal.is_empty() {
        return Vec::new();
    }
    BandpassPlan::new(signal.len()).apply(signal.iter().copied(), sampling_rate, filter)
}

/// Apply [`ideal_bandpass`] to every column of `matrix`.
pub fn filter_columns(matrix: &Matrix, sampling_rate: f64, filter: &BandpassFilter) -> Matrix {
    if matrix.is_empty() {
        return matrix.clone();
    }
    let plan = BandpassPlan::new(matrix.rows());
    let columns: Vec<Vec<f64>> = (0..matrix.cols())
        .map(|c| {
            let column = (0..matrix.rows()).map(|r| matrix[(r, c)]);
            plan.apply(column, sampling_rate, filter)
        })
        .collect();
    Matrix::from_fn(matrix.rows(), matrix.cols(), |r, c| columns[c][r])
}
