//! Symmetric Hann fades at segment edges.

use crate::buffer::{SampleBuffer, sample_from_f64, sample_to_f64};
use crate::RealFloat;

/// Applies a raised-cosine fade-in and fade-out to segment edges.
///
/// The fade envelope is the rising and falling half of a single Hann window
/// of twice the fade length, so the two edges are mirror images and the
/// envelope reaches zero exactly at the outermost samples.
#[derive(Debug, Clone, Copy)]
pub struct FadeProcessor {
    duration_ms: f64,
}

impl FadeProcessor {
    /// Creates a processor with the given per-edge fade duration.
    pub const fn new(duration_ms: f64) -> Self {
        Self { duration_ms }
    }

    /// Returns a faded copy of `buffer`; the input is left untouched.
    ///
    /// Segments shorter than twice the fade length are returned unchanged
    /// rather than folded into overlapping fades.
    pub fn apply<T: RealFloat>(&self, buffer: &SampleBuffer<T>) -> SampleBuffer<T> {
        let sample_rate = f64::from(buffer.sample_rate());
        let fade_samples = (self.duration_ms / 1000.0 * sample_rate) as usize;
        let length = buffer.samples_per_channel();
        if fade_samples == 0 || length < fade_samples * 2 {
            return buffer.clone();
        }

        let window = hann_window(fade_samples * 2);
        let fade_in = &window[..fade_samples];
        let fade_out = &window[fade_samples..];

        buffer.map_channels(|channel| {
            for (i, &gain) in fade_in.iter().enumerate() {
                channel[i] = sample_from_f64::<T>(sample_to_f64(channel[i]) * gain);
            }
            let tail = length - fade_samples;
            for (i, &gain) in fade_out.iter().enumerate() {
                channel[tail + i] = sample_from_f64::<T>(sample_to_f64(channel[tail + i]) * gain);
            }
        })
    }
}

/// Hann window of length `m`: `0.5 - 0.5 cos(2πk / (m - 1))`.
fn hann_window(m: usize) -> Vec<f64> {
    if m == 1 {
        return vec![1.0];
    }
    (0..m)
        .map(|k| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * k as f64 / (m - 1) as f64).cos())
        .collect()
}
