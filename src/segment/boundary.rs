//! Zero-crossing boundary optimization.
//!
//! Cutting audio at an arbitrary sample leaves a step discontinuity that is
//! audible as a click. The optimizer moves each requested boundary to the
//! nearest zero crossing of the representative channel inside a small search
//! window, so cuts land where the waveform is already near zero.

use crate::buffer::{SampleBuffer, sample_to_f64};
use crate::RealFloat;

/// Relocates nominal segment boundaries to nearby zero crossings.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryOptimizer {
    window_ms: f64,
}

impl BoundaryOptimizer {
    /// Creates an optimizer searching within `window_ms` milliseconds around
    /// each boundary (half the window on each side).
    pub const fn new(window_ms: f64) -> Self {
        Self { window_ms }
    }

    /// Converts `time_ms` to a sample index, relocated to the closest zero
    /// crossing within the search window.
    ///
    /// A crossing is a pair of adjacent samples with opposite signs; it is
    /// represented by whichever endpoint has the smaller absolute amplitude,
    /// so the returned index sits on the quieter side of the sign change.
    /// Ties on distance resolve to the earlier crossing. Signals without any
    /// sign change in the window (DC, silence) keep the nominal position.
    ///
    /// The result is always within `[0, samples_per_channel]` and never
    /// farther than half the window from the nominal position. A nominal
    /// time outside the buffer pins to the nearest edge without searching,
    /// so requesting past-the-end material always cuts at the edge itself.
    pub fn optimize<T: RealFloat>(&self, time_ms: f64, buffer: &SampleBuffer<T>) -> usize {
        let total = buffer.samples_per_channel();
        let sample_rate = f64::from(buffer.sample_rate());
        let nominal = (time_ms / 1000.0 * sample_rate) as isize;
        let base = nominal.clamp(0, total as isize) as usize;
        if nominal < 0 || nominal > total as isize {
            return base;
        }

        let window = (self.window_ms / 1000.0 * sample_rate) as usize;
        let search_start = base.saturating_sub(window / 2);
        let search_end = (base + window / 2).min(total);
        if search_end - search_start < 2 {
            return base;
        }

        let channel = buffer.primary_channel();
        let mut best: Option<(usize, usize)> = None;
        for i in search_start..search_end - 1 {
            let a = sample_to_f64(channel[i]);
            let b = sample_to_f64(channel[i + 1]);
            if a.is_sign_negative() == b.is_sign_negative() {
                continue;
            }
            let candidate = if a.abs() <= b.abs() { i } else { i + 1 };
            let distance = candidate.abs_diff(base);
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((candidate, distance));
            }
        }

        match best {
            Some((candidate, distance)) => {
                tracing::trace!(base, candidate, distance, "boundary moved to zero crossing");
                candidate
            }
            None => base,
        }
    }
}
