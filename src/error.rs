//! Error types and result utilities for quality analysis operations.

use thiserror::Error;

/// Convenience type alias for results that may contain [`AudioQualityError`].
pub type AudioQualityResult<T> = Result<T, AudioQualityError>;

/// Error types that can occur during quality analysis and segment processing.
///
/// Degenerate numerics (silence, zero-power references) are deliberately not
/// represented here; the metrics engine maps those to sentinel values so that
/// classification stays total. Per-segment processing failures use
/// [`SegmentError`](crate::SegmentError) instead, which carries the segment
/// label for batch reporting.
#[derive(Error, Debug)]
pub enum AudioQualityError {
    /// An input buffer was missing, empty, or inconsistently shaped.
    ///
    /// Rejects the single operation; batch callers continue with siblings.
    #[error("Invalid input error: {0}")]
    InvalidInput(String),

    /// Invalid parameters were provided to an operation.
    ///
    /// This includes cases like negative fade durations or negative
    /// dither amplitudes.
    #[error("Invalid parameter error: {0}")]
    InvalidParameter(String),

    /// A threshold table failed validation.
    ///
    /// This is the only error that aborts an entire run rather than a single
    /// item: classification against a malformed table would be meaningless
    /// for every item.
    #[error("Invalid thresholds error: {0}")]
    InvalidThresholds(String),

    /// A threshold profile could not be serialized or deserialized.
    #[error("Threshold serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
