//! The metrics engine: level, distortion, noise and dynamic-range
//! measurements.
//!
//! Every function here is total: degenerate inputs (silence, zero-power
//! references, numerically perfect matches) map to documented sentinel
//! values instead of NaN or errors, so downstream classification is defined
//! for all inputs.
//!
//! Multi-channel buffers are reduced to the representative channel
//! ([`SampleBuffer::primary_channel`]) for every measurement in an
//! invocation, never a different reduction per metric.

use std::time::Instant;

use crate::buffer::SampleBuffer;
use crate::classify::classify;
use crate::config::QualityThresholds;
use crate::metrics::artifacts::ArtifactReport;
use crate::metrics::filter::Biquad;
use crate::metrics::spectrum::{frequency_to_bin, magnitude_spectrum};
use crate::metrics::types::QualityMetrics;
use crate::{AudioQualityError, AudioQualityResult, RealFloat, SILENCE_DB};

/// THD+N reported for a numerically perfect signal/reference match.
const PERFECT_MATCH_FLOOR_DB: f64 = -120.0;
/// THD+N estimate when no fundamental is found in the musical band.
const NO_FUNDAMENTAL_DEFAULT_DB: f64 = -60.0;
/// THD+N estimate for a spectrally pure tone (no measurable harmonics).
const PURE_TONE_FLOOR_DB: f64 = -80.0;
/// SNR reported when the reference comparison finds zero noise power.
const ZERO_NOISE_CEILING_DB: f64 = 120.0;
/// SNR estimate ceiling when the high-pass residual carries no power.
const ESTIMATE_CEILING_DB: f64 = 100.0;
/// Lower edge of the band searched for a musical fundamental, in Hz.
const FUNDAMENTAL_BAND_LOW_HZ: f64 = 80.0;
/// Upper edge of the band searched for a musical fundamental, in Hz.
const FUNDAMENTAL_BAND_HIGH_HZ: f64 = 1000.0;
/// High-pass cutoff for the noise-floor proxy, as a fraction of Nyquist.
const NOISE_PROXY_CUTOFF_RATIO: f64 = 0.8;

fn mean_power(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|x| x * x).sum::<f64>() / samples.len() as f64
}

/// Truncates both channels to the shorter length and returns the mean power
/// of the difference signal and of the reference over that range.
fn aligned_powers(signal: &[f64], reference: &[f64]) -> (f64, f64) {
    let len = signal.len().min(reference.len());
    let error_power = if len == 0 {
        0.0
    } else {
        signal[..len]
            .iter()
            .zip(&reference[..len])
            .map(|(s, r)| (s - r) * (s - r))
            .sum::<f64>()
            / len as f64
    };
    (error_power, mean_power(&reference[..len]))
}

/// Peak level of the representative channel in dBFS.
///
/// All-zero (or empty) material returns [`SILENCE_DB`], never NaN.
pub fn peak_level_db<T: RealFloat>(buffer: &SampleBuffer<T>) -> f64 {
    let peak = buffer
        .primary_channel_f64()
        .iter()
        .fold(0.0_f64, |acc, &x| acc.max(x.abs()));
    if peak == 0.0 {
        SILENCE_DB
    } else {
        20.0 * peak.log10()
    }
}

/// RMS level of the representative channel in dBFS.
///
/// All-zero (or empty) material returns [`SILENCE_DB`], never NaN.
pub fn rms_level_db<T: RealFloat>(buffer: &SampleBuffer<T>) -> f64 {
    let rms = mean_power(&buffer.primary_channel_f64()).sqrt();
    if rms == 0.0 {
        SILENCE_DB
    } else {
        20.0 * rms.log10()
    }
}

/// Total Harmonic Distortion + Noise of `signal` against `reference`, in dB.
///
/// Both buffers are reduced to their representative channel and truncated to
/// the shorter length; the error signal's power is expressed relative to the
/// reference power. A zero-power reference returns [`SILENCE_DB`]; a
/// numerically perfect match returns the −120 dB floor rather than −∞.
pub fn thd_plus_n_db<T: RealFloat>(
    signal: &SampleBuffer<T>,
    reference: &SampleBuffer<T>,
) -> f64 {
    let s = signal.primary_channel_f64();
    let r = reference.primary_channel_f64();
    let (error_power, reference_power) = aligned_powers(&s, &r);

    if reference_power == 0.0 {
        return SILENCE_DB;
    }
    let ratio = error_power / reference_power;
    if ratio <= 0.0 {
        return PERFECT_MATCH_FLOOR_DB;
    }
    10.0 * ratio.log10()
}

/// Reference-free THD estimate from harmonic content.
///
/// Finds the fundamental as the strongest spectral peak between 80 Hz and
/// 1 kHz, sums power at harmonics 2–5 below Nyquist, and expresses their
/// ratio to the fundamental in dB. Returns a neutral −60 dB when no
/// fundamental exists in-band, and −80 dB for a spectrally pure tone.
pub fn estimate_thd_plus_n_db<T: RealFloat>(buffer: &SampleBuffer<T>) -> f64 {
    let samples = buffer.primary_channel_f64();
    if samples.is_empty() {
        return NO_FUNDAMENTAL_DEFAULT_DB;
    }

    let spectrum = magnitude_spectrum(&samples);
    let n = spectrum.len();
    let sample_rate = buffer.sample_rate();
    let bin_hz = sample_rate as f64 / n as f64;

    // Strongest positive-frequency bin in the musical band.
    let mut fundamental: Option<(usize, f64)> = None;
    for k in 0..=n / 2 {
        let freq = k as f64 * bin_hz;
        if freq > FUNDAMENTAL_BAND_LOW_HZ && freq < FUNDAMENTAL_BAND_HIGH_HZ {
            let magnitude = spectrum[k];
            if fundamental.is_none_or(|(_, best)| magnitude > best) {
                fundamental = Some((k, magnitude));
            }
        }
    }
    let Some((fundamental_bin, fundamental_magnitude)) = fundamental else {
        return NO_FUNDAMENTAL_DEFAULT_DB;
    };

    let fundamental_power = fundamental_magnitude * fundamental_magnitude;
    if fundamental_power == 0.0 {
        return NO_FUNDAMENTAL_DEFAULT_DB;
    }

    let fundamental_hz = fundamental_bin as f64 * bin_hz;
    let nyquist = sample_rate as f64 / 2.0;
    let mut harmonic_power = 0.0;
    for harmonic in 2..=5u32 {
        let harmonic_hz = fundamental_hz * f64::from(harmonic);
        if harmonic_hz < nyquist {
            let bin = frequency_to_bin(harmonic_hz, n, sample_rate);
            harmonic_power += spectrum[bin] * spectrum[bin];
        }
    }

    let ratio = harmonic_power / fundamental_power;
    if ratio <= 0.0 {
        return PURE_TONE_FLOOR_DB;
    }
    10.0 * ratio.log10()
}

/// Signal-to-Noise Ratio of `signal` against `reference`, in dB.
///
/// Noise is the aligned difference signal. Zero noise power maps to the
/// 120 dB ceiling; a zero-power reference maps to [`SILENCE_DB`].
pub fn snr_db<T: RealFloat>(signal: &SampleBuffer<T>, reference: &SampleBuffer<T>) -> f64 {
    let s = signal.primary_channel_f64();
    let r = reference.primary_channel_f64();
    let (noise_power, reference_power) = aligned_powers(&s, &r);

    if noise_power == 0.0 {
        return ZERO_NOISE_CEILING_DB;
    }
    if reference_power == 0.0 {
        return SILENCE_DB;
    }
    10.0 * (reference_power / noise_power).log10()
}

/// Reference-free SNR estimate.
///
/// High-pass filters the representative channel at 80% of Nyquist and treats
/// the zero-phase residual as a noise-floor proxy. Silence maps to
/// [`SILENCE_DB`]; a residual with no power maps to the 100 dB estimate
/// ceiling.
pub fn estimate_snr_db<T: RealFloat>(buffer: &SampleBuffer<T>) -> f64 {
    let samples = buffer.primary_channel_f64();
    let signal_power = mean_power(&samples);
    if signal_power == 0.0 {
        return SILENCE_DB;
    }

    let sample_rate = buffer.sample_rate() as f64;
    let cutoff_hz = NOISE_PROXY_CUTOFF_RATIO * sample_rate / 2.0;
    let residual = Biquad::butterworth_highpass(cutoff_hz, sample_rate).process_zero_phase(&samples);

    let noise_power = mean_power(&residual);
    if noise_power == 0.0 {
        return ESTIMATE_CEILING_DB;
    }
    10.0 * (signal_power / noise_power).log10()
}

/// Dynamic-range preservation of `signal` relative to `reference`, as a
/// percentage capped at 100%.
///
/// Uses the peak-to-trough span of each representative channel. A
/// zero-range reference yields 100%, and comparing a buffer with itself
/// yields exactly 100%.
pub fn dynamic_range_preservation<T: RealFloat>(
    signal: &SampleBuffer<T>,
    reference: &SampleBuffer<T>,
) -> f64 {
    fn span(samples: &[f64]) -> f64 {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &x in samples {
            min = min.min(x);
            max = max.max(x);
        }
        if min > max { 0.0 } else { max - min }
    }

    let reference_span = span(&reference.primary_channel_f64());
    if reference_span == 0.0 {
        return 100.0;
    }
    let signal_span = span(&signal.primary_channel_f64());
    (signal_span / reference_span * 100.0).min(100.0)
}

/// The quality analysis engine.
///
/// Holds a validated threshold table and composes the metric functions,
/// artifact detectors and classifier into a single [`QualityMetrics`]
/// record. Construction validates the thresholds once; analysis itself
/// never fails on degenerate audio, only on missing input.
#[derive(Debug, Clone)]
pub struct QualityAnalyzer {
    thresholds: QualityThresholds,
}

impl QualityAnalyzer {
    /// Creates an analyzer, validating `thresholds`.
    ///
    /// # Errors
    /// Returns [`AudioQualityError::InvalidThresholds`] for a malformed
    /// table; this aborts the run before any per-item work starts.
    pub fn new(thresholds: QualityThresholds) -> AudioQualityResult<Self> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    /// The threshold table this analyzer classifies against.
    pub const fn thresholds(&self) -> &QualityThresholds {
        &self.thresholds
    }

    /// Comprehensive quality analysis of `buffer`, optionally against an
    /// unprocessed `reference`.
    ///
    /// With a reference, THD+N, SNR and dynamic-range preservation are
    /// measured by direct comparison; without one they fall back to the
    /// harmonic and noise-floor estimators (and dynamic range is absent,
    /// not zero).
    ///
    /// # Errors
    /// Returns [`AudioQualityError::InvalidInput`] if `buffer` is empty.
    pub fn analyze<T: RealFloat>(
        &self,
        buffer: &SampleBuffer<T>,
        reference: Option<&SampleBuffer<T>>,
    ) -> AudioQualityResult<QualityMetrics> {
        self.analyze_with_resources(buffer, reference, None, None)
    }

    /// Like [`Self::analyze`], with caller-supplied resource figures so the
    /// classifier can apply its performance clamps.
    ///
    /// `memory_usage_mb` is the peak memory delta attributed to producing
    /// `buffer`; `file_size_mb` is the size of the output artifact. Both are
    /// measured by the caller — this crate has no view of process memory or
    /// the file system.
    pub fn analyze_with_resources<T: RealFloat>(
        &self,
        buffer: &SampleBuffer<T>,
        reference: Option<&SampleBuffer<T>>,
        memory_usage_mb: Option<f64>,
        file_size_mb: Option<f64>,
    ) -> AudioQualityResult<QualityMetrics> {
        if buffer.is_empty() {
            return Err(AudioQualityError::InvalidInput(
                "Cannot analyze an empty buffer".to_string(),
            ));
        }
        let start = Instant::now();

        let mut metrics = QualityMetrics {
            sample_rate: Some(buffer.sample_rate()),
            channels: Some(buffer.num_channels()),
            duration_seconds: Some(buffer.duration_seconds()),
            memory_usage_mb,
            file_size_mb,
            ..QualityMetrics::default()
        };

        let peak = peak_level_db(buffer);
        let rms = rms_level_db(buffer);
        metrics.peak_level_db = Some(peak);
        metrics.rms_level_db = Some(rms);
        // Crest factor is undefined for silence (−∞ − −∞); leave it absent
        // rather than storing NaN.
        metrics.crest_factor_db = (peak.is_finite() && rms.is_finite()).then(|| peak - rms);

        match reference {
            Some(reference) => {
                if reference.num_channels() != buffer.num_channels() {
                    tracing::debug!(
                        signal_channels = buffer.num_channels(),
                        reference_channels = reference.num_channels(),
                        "channel count mismatch; comparing representative channels"
                    );
                }
                if reference.sample_rate() != buffer.sample_rate() {
                    tracing::warn!(
                        signal_rate = buffer.sample_rate(),
                        reference_rate = reference.sample_rate(),
                        "sample rate mismatch between signal and reference"
                    );
                }
                metrics.thd_plus_n_db = Some(thd_plus_n_db(buffer, reference));
                metrics.snr_db = Some(snr_db(buffer, reference));
                metrics.dynamic_range_pct = Some(dynamic_range_preservation(buffer, reference));
            }
            None => {
                metrics.thd_plus_n_db = Some(estimate_thd_plus_n_db(buffer));
                metrics.snr_db = Some(estimate_snr_db(buffer));
            }
        }

        let report = ArtifactReport::detect(buffer, &self.thresholds);
        metrics.clipping_detected = report.clipping;
        metrics.aliasing_detected = report.aliasing;
        metrics.dc_offset_detected = report.dc_offset;
        metrics.artifacts_detected = report.any();

        metrics.processing_time_ms = Some(start.elapsed().as_secs_f64() * 1000.0);

        let (level, score) = classify(&metrics, &self.thresholds);
        metrics.quality_level = Some(level);
        metrics.quality_score = Some(score);

        Ok(metrics)
    }
}
