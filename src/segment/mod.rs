//! Perceptually-informed segment extraction.
//!
//! # Modules
//!
//! - [`boundary`] - Zero-crossing boundary optimization
//! - [`fade`] - Symmetric Hann edge fades
//! - [`dither`] - TPDF dither
//! - [`pipeline`] - The extraction pipeline tying the stages together
//! - [`parallel`] - Rayon-backed batch processing (feature `parallel-processing`)

pub mod boundary;
pub mod dither;
pub mod fade;
#[cfg(feature = "parallel-processing")]
pub mod parallel;
pub mod pipeline;

pub use boundary::BoundaryOptimizer;
pub use dither::DitherProcessor;
pub use fade::FadeProcessor;
#[cfg(feature = "batch-processing")]
pub use pipeline::BatchOutcome;
pub use pipeline::{SegmentError, SegmentOutcome, SegmentPipeline, SegmentRequest};
