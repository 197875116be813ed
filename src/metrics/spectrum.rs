//! Shared FFT helpers for the metric and artifact analyses.

use num_complex::Complex;
use rustfft::FftPlanner;

/// Magnitude of the full (two-sided) FFT of `samples`.
///
/// The transform length equals the input length; rustfft handles non
/// power-of-two sizes. Returns an empty vector for empty input.
pub(crate) fn magnitude_spectrum(samples: &[f64]) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut buffer: Vec<Complex<f64>> = samples
        .iter()
        .map(|&x| Complex::new(x, 0.0))
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);

    buffer.iter().map(|c| c.norm()).collect()
}

/// Frequency in Hz associated with FFT bin `k` of an `n`-point transform,
/// folded to its absolute value (bins above n/2 are negative frequencies).
pub(crate) fn bin_frequency(k: usize, n: usize, sample_rate: u32) -> f64 {
    let step = sample_rate as f64 / n as f64;
    if k <= n / 2 {
        k as f64 * step
    } else {
        (n - k) as f64 * step
    }
}

/// Index of the bin closest to `frequency` among the positive-frequency bins.
pub(crate) fn frequency_to_bin(frequency: f64, n: usize, sample_rate: u32) -> usize {
    let bin = (frequency * n as f64 / sample_rate as f64).round() as usize;
    bin.min(n / 2)
}
