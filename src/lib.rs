// Correctness and logic
#![warn(clippy::unit_cmp)]
#![warn(clippy::match_same_arms)]
// Performance-focused
#![warn(clippy::inefficient_to_string)]
#![warn(clippy::map_clone)]
#![warn(clippy::unnecessary_to_owned)]
#![warn(clippy::needless_collect)]
// Style and idiomatic Rust
#![warn(clippy::redundant_clone)]
#![warn(clippy::needless_return)]
#![warn(clippy::manual_map)]
#![warn(clippy::unwrap_used)]
// Maintainability
#![warn(clippy::missing_panics_doc)]
#![deny(missing_docs)]

//! # audio_quality
//!
//! Objective, standards-referenced quality metrics and perceptually-informed
//! segment extraction for decoded audio sample buffers.
//!
//! The crate is the DSP core of an audio splitting toolchain: it does not read
//! or write audio files. A codec layer hands it decoded [`SampleBuffer`]s, a
//! configuration layer hands it a [`QualityThresholds`] profile, and it hands
//! back [`QualityMetrics`] and [`SegmentOutcome`] records.
//!
//! ## Overview
//!
//! - [`metrics`] — level, distortion, noise and dynamic-range measurements
//!   (peak/RMS/crest factor, THD+N, SNR, dynamic-range preservation) plus
//!   artifact detection (clipping, aliasing, DC offset).
//! - [`classify`] — reduces a metrics set to a [`QualityLevel`] and a 0–100
//!   score against a threshold profile.
//! - [`segment`] — zero-crossing boundary optimization, Hann-window fades,
//!   TPDF dithering, and the pipeline that composes them per segment with
//!   quality validation against an untouched reference slice.
//!
//! ## Quick start
//!
//! ```rust
//! use audio_quality::{
//!     QualityAnalyzer, QualityThresholds, SegmentOptions, SegmentPipeline,
//!     SegmentRequest, sine_wave,
//! };
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let audio = sine_wave::<f64>(440.0, Duration::from_secs(2), 44100, 0.5);
//!
//! // Standalone analysis.
//! let analyzer = QualityAnalyzer::new(QualityThresholds::default())?;
//! let metrics = analyzer.analyze(&audio, None)?;
//! assert!(metrics.peak_level_db.is_some());
//!
//! // Segment extraction with fades, dither and a quality gate.
//! let pipeline = SegmentPipeline::new(SegmentOptions::default(), QualityThresholds::default())?;
//! let outcome = pipeline.process_segment(&audio, &SegmentRequest::new(250.0, 1250.0, "intro"))?;
//! assert!(outcome.metrics.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error handling
//!
//! Invalid inputs (empty buffers, malformed threshold tables) surface as
//! [`AudioQualityError`]. Degenerate numerics — silence, zero-power
//! references, numerically perfect matches — never error: the metrics engine
//! maps them to documented sentinel values so classification is total.
//! Per-segment failures are reported through [`SegmentError`] and never abort
//! sibling segments in a batch.

mod error;

pub mod buffer;
pub mod classify;
pub mod config;
pub mod metrics;
pub mod segment;
pub mod utils;

use std::fmt::Debug;

pub use crate::buffer::{AudioData, SampleBuffer};
pub use crate::classify::classify;
pub use crate::config::{QualityProfile, QualityThresholds, SegmentOptions};
pub use crate::error::{AudioQualityError, AudioQualityResult};
pub use crate::metrics::{
    ArtifactReport, QualityAnalyzer, QualityLevel, QualityMetrics, detect_aliasing,
    detect_clipping, detect_dc_offset, dynamic_range_preservation, estimate_snr_db,
    estimate_thd_plus_n_db, peak_level_db, rms_level_db, snr_db, thd_plus_n_db,
};
pub use crate::segment::{
    BoundaryOptimizer, DitherProcessor, FadeProcessor, SegmentError, SegmentOutcome,
    SegmentPipeline, SegmentRequest,
};

#[cfg(feature = "batch-processing")]
pub use crate::segment::BatchOutcome;
pub use crate::utils::generation::{silence, sine_wave, stereo_sine_wave, white_noise};

#[cfg(feature = "parallel-processing")]
pub use crate::segment::parallel::process_batch_parallel;

use num_traits::{Float, FloatConst, NumCast};

/// Marker trait for real floating-point sample types (f32, f64).
///
/// All DSP in this crate is defined over floating-point samples; metric
/// arithmetic is carried out in `f64` regardless of the buffer's native
/// precision.
pub trait RealFloat: Float + FloatConst + NumCast + Debug + Send + Sync + 'static {}

impl RealFloat for f32 {}
impl RealFloat for f64 {}

/// dB value reported for silent (all-zero) material instead of NaN.
pub const SILENCE_DB: f64 = f64::NEG_INFINITY;
