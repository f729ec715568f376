use std::f64::consts::PI;

use evoked_linalg::Matrix;

/// Generate the sine/cosine reference of a stimulation frequency.
///
/// Row `w` holds, for `h = 1..=harmonics`, the pair
/// `sin(2 pi f h t), cos(2 pi f h t)` at `t = w / sampling_rate`.
///
/// # Arguments
///
/// * `frequency` - The stimulation frequency in Hz.
/// * `sampling_rate` - The sampling rate in Hz.
/// * `window_size` - The number of rows.
/// * `harmonics` - The number of harmonics, including the fundamental.
///
/// # Returns
///
/// A `window_size x 2 * harmonics` matrix.
pub fn harmonic_reference(
    frequency: f64,
    sampling_rate: f64,
    window_size: usize,
    harmonics: usize,
) -> Matrix {
    Matrix::from_fn(window_size, 2 * harmonics, |w, c| {
        let t = w as f64 / sampling_rate;
        let multiplier = (c / 2 + 1) as f64;
        let angle = 2.0 * PI * frequency * multiplier * t;
        if c % 2 == 0 {
            angle.sin()
        } else {
            angle.cos()
        }
    })
}
