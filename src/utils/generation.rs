//! Audio signal generation utilities.
//!
//! These generators build deterministic test material: pure tones, silence
//! and seeded white noise. They are used heavily by this crate's own tests
//! and are exported for callers that need known-quality input.

use std::time::Duration;

use ndarray::{Array1, Array2};
use num_traits::FloatConst;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::buffer::{SampleBuffer, sample_from_f64};
use crate::RealFloat;

fn num_samples(duration: Duration, sample_rate: u32) -> usize {
    (duration.as_secs_f64() * f64::from(sample_rate)).round() as usize
}

/// Generates a mono sine wave of the given frequency and amplitude.
///
/// Sample `n` is `amplitude * sin(2π * frequency * n / sample_rate)`, so a
/// tone whose period divides the sample rate crosses zero on exact sample
/// indices.
pub fn sine_wave<T: RealFloat>(
    frequency: f64,
    duration: Duration,
    sample_rate: u32,
    amplitude: f64,
) -> SampleBuffer<T> {
    let n = num_samples(duration, sample_rate);
    let step = 2.0 * f64::PI() * frequency / f64::from(sample_rate);
    let data = Array1::from_iter(
        (0..n).map(|i| sample_from_f64::<T>(amplitude * (step * i as f64).sin())),
    );
    SampleBuffer::new_mono(data, sample_rate)
}

/// Generates a stereo buffer carrying the same sine wave on both channels.
pub fn stereo_sine_wave<T: RealFloat>(
    frequency: f64,
    duration: Duration,
    sample_rate: u32,
    amplitude: f64,
) -> SampleBuffer<T> {
    let mono = sine_wave::<T>(frequency, duration, sample_rate, amplitude);
    let channel = mono.primary_channel();
    let mut data = Array2::zeros((2, channel.len()));
    data.row_mut(0).assign(&channel);
    data.row_mut(1).assign(&channel);
    SampleBuffer::new_multi_channel(data, sample_rate)
}

/// Generates a mono buffer of digital silence.
pub fn silence<T: RealFloat>(duration: Duration, sample_rate: u32) -> SampleBuffer<T> {
    SampleBuffer::new_mono(Array1::zeros(num_samples(duration, sample_rate)), sample_rate)
}

/// Generates seeded uniform white noise in `[-amplitude, amplitude]`.
///
/// The same seed always yields the same buffer, so tests against noise are
/// reproducible.
pub fn white_noise<T: RealFloat>(
    duration: Duration,
    sample_rate: u32,
    amplitude: f64,
    seed: u64,
) -> SampleBuffer<T> {
    let n = num_samples(duration, sample_rate);
    let mut rng = StdRng::seed_from_u64(seed);
    let data = Array1::from_iter(
        (0..n).map(|_| sample_from_f64::<T>(rng.gen_range(-amplitude..=amplitude))),
    );
    SampleBuffer::new_mono(data, sample_rate)
}
