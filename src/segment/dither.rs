//! TPDF dither for segment output.
//!
//! Adding triangular-PDF noise at a sub-audible amplitude decorrelates the
//! quantization error introduced when segments are later written to integer
//! PCM. The triangular distribution is the sum rule: the difference of two
//! independent uniform variables.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::buffer::{SampleBuffer, sample_from_f64, sample_to_f64};
use crate::RealFloat;

/// Adds triangular-PDF dither and guards against clipping.
#[derive(Debug, Clone, Copy)]
pub struct DitherProcessor {
    amplitude: f64,
    seed: Option<u64>,
}

impl DitherProcessor {
    /// Creates a processor with the given per-component amplitude.
    ///
    /// With `seed` set the noise sequence is reproducible; `None` draws a
    /// fresh seed from OS entropy on every call.
    pub const fn new(amplitude: f64, seed: Option<u64>) -> Self {
        Self { amplitude, seed }
    }

    /// Returns a dithered copy of `buffer`; the input is left untouched.
    ///
    /// Each sample receives the difference of two independent uniform draws
    /// in `[-amplitude, amplitude]`. If the result exceeds digital full
    /// scale, the whole buffer is rescaled to a 0.99 peak, so the output
    /// never clips.
    pub fn apply<T: RealFloat>(&self, buffer: &SampleBuffer<T>) -> SampleBuffer<T> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut dithered = buffer.map_channels(|channel| {
            for sample in channel.iter_mut() {
                let noise = rng.gen_range(-self.amplitude..=self.amplitude)
                    - rng.gen_range(-self.amplitude..=self.amplitude);
                *sample = sample_from_f64::<T>(sample_to_f64(*sample) + noise);
            }
        });

        let peak = dithered.peak();
        if peak > 1.0 {
            dithered.scale_in_place(0.99 / peak);
            tracing::debug!(peak, "rescaled dithered segment to avoid clipping");
        }
        dithered
    }
}
