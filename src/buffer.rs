//! Core sample buffer representation.
//!
//! [`SampleBuffer`] pairs raw floating-point samples with the metadata every
//! DSP stage needs (sample rate, channel layout). Mono audio is stored as a
//! 1D `ndarray` array; multi-channel audio as a 2D array with channels as
//! rows, which keeps per-channel operations contiguous.
//!
//! Buffers are caller-owned. DSP stages that must leave their input intact
//! for later comparison (fades, dither) return new buffers instead of
//! mutating in place.

use ndarray::{Array1, Array2, ArrayView1, Axis, s};

use crate::{AudioQualityError, AudioQualityResult, RealFloat};

/// Internal storage for mono vs. multi-channel audio data.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioData<T: RealFloat> {
    /// Single-channel audio as a 1D array.
    Mono(Array1<T>),
    /// Multi-channel audio with shape `(channels, samples_per_channel)`.
    MultiChannel(Array2<T>),
}

/// A decoded audio buffer: samples plus sample rate and channel layout.
///
/// The invariant that all channels have equal length is structural: a
/// multi-channel buffer is a rectangular 2D array.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer<T: RealFloat> {
    pub(crate) data: AudioData<T>,
    sample_rate: u32,
}

impl<T: RealFloat> SampleBuffer<T> {
    /// Creates a mono buffer from a 1D array of samples.
    pub fn new_mono(data: Array1<T>, sample_rate: u32) -> Self {
        Self {
            data: AudioData::Mono(data),
            sample_rate,
        }
    }

    /// Creates a multi-channel buffer from a 2D array with channels as rows.
    pub fn new_multi_channel(data: Array2<T>, sample_rate: u32) -> Self {
        Self {
            data: AudioData::MultiChannel(data),
            sample_rate,
        }
    }

    /// Sample rate in Hz.
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels (1 for mono).
    pub fn num_channels(&self) -> usize {
        match &self.data {
            AudioData::Mono(_) => 1,
            AudioData::MultiChannel(arr) => arr.nrows(),
        }
    }

    /// Number of samples in each channel.
    pub fn samples_per_channel(&self) -> usize {
        match &self.data {
            AudioData::Mono(arr) => arr.len(),
            AudioData::MultiChannel(arr) => arr.ncols(),
        }
    }

    /// Total number of samples across all channels.
    pub fn total_samples(&self) -> usize {
        match &self.data {
            AudioData::Mono(arr) => arr.len(),
            AudioData::MultiChannel(arr) => arr.len(),
        }
    }

    /// Duration of the buffer in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples_per_channel() as f64 / self.sample_rate as f64
    }

    /// Returns true if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.total_samples() == 0
    }

    /// View of the representative channel used for metric reduction.
    ///
    /// Multi-channel buffers reduce to channel 0 everywhere in this crate so
    /// that every metric in one analysis sees the same signal.
    pub fn primary_channel(&self) -> ArrayView1<'_, T> {
        match &self.data {
            AudioData::Mono(arr) => arr.view(),
            AudioData::MultiChannel(arr) => {
                if arr.nrows() == 0 {
                    let empty: &[T] = &[];
                    ArrayView1::from(empty)
                } else {
                    arr.row(0)
                }
            }
        }
    }

    /// The representative channel copied out as `f64` for metric arithmetic.
    pub(crate) fn primary_channel_f64(&self) -> Vec<f64> {
        self.primary_channel()
            .iter()
            .map(|&x| sample_to_f64(x))
            .collect()
    }

    /// View of one channel, or `None` if the index is out of range.
    pub fn channel(&self, index: usize) -> Option<ArrayView1<'_, T>> {
        match &self.data {
            AudioData::Mono(arr) => (index == 0).then(|| arr.view()),
            AudioData::MultiChannel(arr) => (index < arr.nrows()).then(|| arr.row(index)),
        }
    }

    /// Iterates over every sample in every channel.
    pub fn iter_samples(&self) -> impl Iterator<Item = T> + '_ {
        let (mono, multi) = match &self.data {
            AudioData::Mono(arr) => (Some(arr.iter()), None),
            AudioData::MultiChannel(arr) => (None, Some(arr.iter())),
        };
        mono.into_iter().flatten().chain(multi.into_iter().flatten()).copied()
    }

    /// Peak (maximum absolute value) across all channels, as `f64`.
    ///
    /// Returns 0.0 for an empty buffer.
    pub fn peak(&self) -> f64 {
        self.iter_samples()
            .map(|x| sample_to_f64(x).abs())
            .fold(0.0, f64::max)
    }

    /// Copies the sample range `[start, end)` of every channel into a new
    /// buffer.
    ///
    /// The returned buffer never aliases the source, so the source stays
    /// available as an untouched reference for later quality comparison.
    pub fn slice_copy(&self, start: usize, end: usize) -> AudioQualityResult<Self> {
        if start >= end || end > self.samples_per_channel() {
            return Err(AudioQualityError::InvalidParameter(format!(
                "Invalid sample range {start}..{end} for buffer of length {}",
                self.samples_per_channel()
            )));
        }
        let data = match &self.data {
            AudioData::Mono(arr) => AudioData::Mono(arr.slice(s![start..end]).to_owned()),
            AudioData::MultiChannel(arr) => {
                AudioData::MultiChannel(arr.slice(s![.., start..end]).to_owned())
            }
        };
        Ok(Self {
            data,
            sample_rate: self.sample_rate,
        })
    }

    /// Applies a function to every channel's samples, yielding a new buffer.
    pub(crate) fn map_channels<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&mut Array1<T>),
    {
        let data = match &self.data {
            AudioData::Mono(arr) => {
                let mut out = arr.clone();
                f(&mut out);
                AudioData::Mono(out)
            }
            AudioData::MultiChannel(arr) => {
                let mut out = arr.clone();
                for mut channel in out.axis_iter_mut(Axis(0)) {
                    let mut owned = channel.to_owned();
                    f(&mut owned);
                    channel.assign(&owned);
                }
                AudioData::MultiChannel(out)
            }
        };
        Self {
            data,
            sample_rate: self.sample_rate,
        }
    }

    /// Scales every sample by a constant factor, in place.
    pub(crate) fn scale_in_place(&mut self, factor: f64) {
        let factor_t = sample_from_f64::<T>(factor);
        match &mut self.data {
            AudioData::Mono(arr) => arr.mapv_inplace(|x| x * factor_t),
            AudioData::MultiChannel(arr) => arr.mapv_inplace(|x| x * factor_t),
        }
    }
}

/// Widens a native sample to `f64` for metric arithmetic.
#[inline]
pub(crate) fn sample_to_f64<T: RealFloat>(x: T) -> f64 {
    x.to_f64().unwrap_or(0.0)
}

/// Narrows an `f64` back to the native sample type.
#[inline]
pub(crate) fn sample_from_f64<T: RealFloat>(x: f64) -> T {
    T::from(x).unwrap_or_else(T::zero)
}
