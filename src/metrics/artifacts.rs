//! Detection of digital artifacts: clipping, aliasing, DC offset.

use crate::buffer::SampleBuffer;
use crate::config::QualityThresholds;
use crate::metrics::spectrum::{bin_frequency, magnitude_spectrum};
use crate::RealFloat;

/// Fraction of total spectral energy above the aliasing band boundary that
/// is considered suspicious.
const ALIASING_ENERGY_RATIO: f64 = 0.1;

/// True if the representative channel's peak reaches the near-full-scale
/// `threshold` (default 0.99).
pub fn detect_clipping<T: RealFloat>(buffer: &SampleBuffer<T>, threshold: f64) -> bool {
    let peak = buffer
        .primary_channel_f64()
        .iter()
        .fold(0.0_f64, |acc, &x| acc.max(x.abs()));
    peak >= threshold
}

/// True if high-frequency spectral energy suggests aliasing.
///
/// Computes the magnitude spectrum of the representative channel and compares
/// the mean squared magnitude above `frequency_ratio × Nyquist` (default 40%)
/// against the mean squared magnitude of the whole spectrum. Genuine program
/// material rolls off toward Nyquist; a band carrying more than 10% of the
/// average energy points to folded images.
pub fn detect_aliasing<T: RealFloat>(buffer: &SampleBuffer<T>, frequency_ratio: f64) -> bool {
    let samples = buffer.primary_channel_f64();
    if samples.is_empty() {
        return false;
    }

    let spectrum = magnitude_spectrum(&samples);
    let n = spectrum.len();
    let nyquist = buffer.sample_rate() as f64 / 2.0;
    let band_start_hz = nyquist * frequency_ratio;

    let mut band_energy = 0.0;
    let mut band_bins = 0usize;
    let mut total_energy = 0.0;
    for (k, magnitude) in spectrum.iter().enumerate() {
        let power = magnitude * magnitude;
        total_energy += power;
        if bin_frequency(k, n, buffer.sample_rate()) > band_start_hz {
            band_energy += power;
            band_bins += 1;
        }
    }

    if band_bins == 0 || total_energy == 0.0 {
        return false;
    }

    let band_mean = band_energy / band_bins as f64;
    let total_mean = total_energy / n as f64;
    band_mean / total_mean > ALIASING_ENERGY_RATIO
}

/// True if the representative channel carries a DC offset larger than
/// `threshold` (default 0.01).
pub fn detect_dc_offset<T: RealFloat>(buffer: &SampleBuffer<T>, threshold: f64) -> bool {
    let samples = buffer.primary_channel_f64();
    if samples.is_empty() {
        return false;
    }
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    mean.abs() > threshold
}

/// Result of running all artifact detectors over one buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtifactReport {
    /// Peak sample at or above the digital full-scale threshold.
    pub clipping: bool,
    /// Suspicious high-frequency energy near Nyquist.
    pub aliasing: bool,
    /// Non-zero mean sample value.
    pub dc_offset: bool,
}

impl ArtifactReport {
    /// Runs every detector with the thresholds from `thresholds`.
    pub fn detect<T: RealFloat>(buffer: &SampleBuffer<T>, thresholds: &QualityThresholds) -> Self {
        Self {
            clipping: detect_clipping(buffer, thresholds.clipping_threshold),
            aliasing: detect_aliasing(buffer, thresholds.aliasing_frequency_ratio),
            dc_offset: detect_dc_offset(buffer, thresholds.dc_offset_threshold),
        }
    }

    /// Aggregate flag: any detector fired.
    pub const fn any(&self) -> bool {
        self.clipping || self.aliasing || self.dc_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::generation::{sine_wave, white_noise};
    use ndarray::array;
    use std::time::Duration;

    #[test]
    fn test_clipping_on_full_scale_sample() {
        let clean = SampleBuffer::new_mono(array![0.5f64, -0.5, 0.3], 44100);
        let clipped = SampleBuffer::new_mono(array![0.5f64, -1.0, 0.3], 44100);
        assert!(!detect_clipping(&clean, 0.99));
        assert!(detect_clipping(&clipped, 0.99));
    }

    #[test]
    fn test_dc_offset_detection() {
        let centered = sine_wave::<f64>(440.0, Duration::from_millis(100), 44100, 0.5);
        assert!(!detect_dc_offset(&centered, 0.01));

        let offset = SampleBuffer::new_mono(
            centered.primary_channel().mapv(|x| x + 0.05),
            44100,
        );
        assert!(detect_dc_offset(&offset, 0.01));
    }

    #[test]
    fn test_low_frequency_tone_is_not_aliasing() {
        let tone = sine_wave::<f64>(440.0, Duration::from_millis(200), 44100, 0.5);
        assert!(!detect_aliasing(&tone, 0.4));
    }

    #[test]
    fn test_near_nyquist_tone_flags_aliasing() {
        // A pure 20 kHz tone at 44.1 kHz concentrates all its energy above
        // 40% of Nyquist (8.82 kHz).
        let tone = sine_wave::<f64>(20_000.0, Duration::from_millis(200), 44100, 0.5);
        assert!(detect_aliasing(&tone, 0.4));
    }

    #[test]
    fn test_silence_has_no_artifacts() {
        let quiet = SampleBuffer::new_mono(ndarray::Array1::<f64>::zeros(1024), 44100);
        let report = ArtifactReport::detect(&quiet, &QualityThresholds::default());
        assert!(!report.any());
    }

    #[test]
    fn test_report_aggregates_flags() {
        let noise = white_noise::<f64>(Duration::from_millis(100), 44100, 0.995, 7);
        let report = ArtifactReport::detect(&noise, &QualityThresholds::default());
        // Broadband noise at near-full-scale amplitude trips at least the
        // clipping detector, so the aggregate flag must be set.
        assert!(report.clipping);
        assert!(report.any());
    }
}
