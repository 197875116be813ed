//! The segment extraction pipeline.
//!
//! One pipeline value holds the validated options, the quality analyzer and
//! the DSP stages, and processes any number of segment requests against a
//! source buffer. Per-segment failures never abort a batch; only invalid
//! configuration does, at construction time.

#[cfg(feature = "batch-processing")]
use std::collections::BTreeMap;
#[cfg(feature = "batch-processing")]
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::buffer::SampleBuffer;
use crate::config::{QualityThresholds, SegmentOptions};
use crate::metrics::{QualityAnalyzer, QualityLevel, QualityMetrics};
use crate::segment::boundary::BoundaryOptimizer;
use crate::segment::dither::DitherProcessor;
use crate::segment::fade::FadeProcessor;
use crate::{AudioQualityError, AudioQualityResult, RealFloat};

/// A requested segment in source-time milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRequest {
    /// Nominal start time in milliseconds.
    pub start_ms: f64,
    /// Nominal end time in milliseconds.
    pub end_ms: f64,
    /// Caller-chosen name carried through to outcomes and errors.
    pub label: String,
}

impl SegmentRequest {
    /// Creates a request for `[start_ms, end_ms)` labelled `label`.
    pub fn new(start_ms: f64, end_ms: f64, label: impl Into<String>) -> Self {
        Self {
            start_ms,
            end_ms,
            label: label.into(),
        }
    }
}

/// A successfully extracted segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentOutcome<T: RealFloat> {
    /// The processed segment audio.
    pub buffer: SampleBuffer<T>,
    /// Label from the originating request.
    pub label: String,
    /// First sample of the extracted range, after boundary optimization.
    pub start_sample: usize,
    /// One past the last sample of the extracted range.
    pub end_sample: usize,
    /// Actual duration of the extracted range in milliseconds.
    pub duration_ms: f64,
    /// Quality metrics against the untouched reference slice, when
    /// validation was enabled.
    pub metrics: Option<QualityMetrics>,
    /// The segment classified below the quality floor but the gate was set
    /// to warn rather than fail.
    pub quality_warning: bool,
}

/// Per-segment failure.
#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    /// The source buffer holds no samples.
    #[error("Cannot extract segments from an empty source buffer")]
    EmptySource,
    /// The request's time range is empty or inverted.
    #[error("Segment '{label}' has a degenerate time range: {start_ms}..{end_ms} ms")]
    DegenerateRange {
        /// Label of the offending request.
        label: String,
        /// Requested start time.
        start_ms: f64,
        /// Requested end time.
        end_ms: f64,
    },
    /// The segment classified below the configured quality floor and the
    /// gate was set to fail.
    #[error(
        "Segment '{label}' classified {level} (score {score:.1}), below the {floor} quality floor"
    )]
    QualityGate {
        /// Label of the offending request.
        label: String,
        /// Classified level of the processed segment.
        level: QualityLevel,
        /// Configured minimum level.
        floor: QualityLevel,
        /// Numerical quality score.
        score: f64,
    },
    /// Extraction or analysis failed.
    #[error(transparent)]
    Analysis(#[from] AudioQualityError),
}

/// Result of a batch run: one entry per processed request, in order.
#[cfg(feature = "batch-processing")]
#[derive(Debug)]
pub struct BatchOutcome<T: RealFloat> {
    /// Per-request results. Shorter than the request list only if the run
    /// was cancelled.
    pub outcomes: Vec<Result<SegmentOutcome<T>, SegmentError>>,
    /// The run stopped early because cancellation was requested.
    pub cancelled: bool,
}

#[cfg(feature = "batch-processing")]
impl<T: RealFloat> BatchOutcome<T> {
    /// Number of successfully extracted segments.
    pub fn processed(&self) -> usize {
        self.outcomes.iter().filter(|r| r.is_ok()).count()
    }

    /// Number of failed segments.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.processed()
    }

    /// Count of successful segments per classified quality level.
    ///
    /// Segments processed without quality validation carry no level and are
    /// not counted.
    pub fn quality_distribution(&self) -> BTreeMap<QualityLevel, usize> {
        let mut distribution = BTreeMap::new();
        for outcome in self.outcomes.iter().flatten() {
            if let Some(level) = outcome.metrics.as_ref().and_then(|m| m.quality_level) {
                *distribution.entry(level).or_insert(0) += 1;
            }
        }
        distribution
    }
}

/// Perceptually-informed segment extraction.
///
/// Processing order per segment: boundary optimization, copy-out, fade,
/// dither, then quality validation of the processed audio against the
/// untouched source slice.
#[derive(Debug, Clone)]
pub struct SegmentPipeline {
    options: SegmentOptions,
    analyzer: QualityAnalyzer,
    boundary: BoundaryOptimizer,
    fade: FadeProcessor,
    dither: DitherProcessor,
}

impl SegmentPipeline {
    /// Creates a pipeline, validating both the options and the thresholds.
    ///
    /// # Errors
    /// Returns [`AudioQualityError::InvalidParameter`] or
    /// [`AudioQualityError::InvalidThresholds`] for malformed configuration;
    /// nothing is processed in that case.
    pub fn new(
        options: SegmentOptions,
        thresholds: QualityThresholds,
    ) -> AudioQualityResult<Self> {
        options.validate()?;
        let analyzer = QualityAnalyzer::new(thresholds)?;
        let boundary = BoundaryOptimizer::new(options.boundary_window_ms);
        let fade = FadeProcessor::new(options.fade_duration_ms);
        let dither = DitherProcessor::new(options.dither_amplitude, options.dither_seed);
        Ok(Self {
            options,
            analyzer,
            boundary,
            fade,
            dither,
        })
    }

    /// The options this pipeline was built with.
    pub const fn options(&self) -> &SegmentOptions {
        &self.options
    }

    /// Extracts and processes one segment from `source`.
    ///
    /// The source is never modified; the outcome owns a processed copy of
    /// the extracted range.
    pub fn process_segment<T: RealFloat>(
        &self,
        source: &SampleBuffer<T>,
        request: &SegmentRequest,
    ) -> Result<SegmentOutcome<T>, SegmentError> {
        if source.is_empty() {
            return Err(SegmentError::EmptySource);
        }
        if request.end_ms <= request.start_ms {
            return Err(SegmentError::DegenerateRange {
                label: request.label.clone(),
                start_ms: request.start_ms,
                end_ms: request.end_ms,
            });
        }

        let total = source.samples_per_channel();
        let start = self.boundary.optimize(request.start_ms, source);
        let end = self.boundary.optimize(request.end_ms, source);

        // After optimization the range must still be non-empty and in
        // bounds; a window landing both boundaries on the same crossing
        // degenerates to a single sample.
        let start = start.min(total - 1);
        let end = end.clamp(start + 1, total);
        tracing::debug!(
            label = %request.label,
            start,
            end,
            "optimized segment boundaries"
        );

        let mut segment = source.slice_copy(start, end).map_err(SegmentError::Analysis)?;
        if self.options.fade_enabled {
            segment = self.fade.apply(&segment);
        }
        if self.options.dither_enabled {
            segment = self.dither.apply(&segment);
        }

        let mut quality_warning = false;
        let metrics = if self.options.quality_validation {
            let reference = source.slice_copy(start, end).map_err(SegmentError::Analysis)?;
            let metrics = self
                .analyzer
                .analyze(&segment, Some(&reference))
                .map_err(SegmentError::Analysis)?;

            if let Some(level) = metrics.quality_level {
                if level < self.options.quality_floor {
                    let score = metrics.quality_score.unwrap_or(0.0);
                    if self.options.fail_on_quality_gate {
                        return Err(SegmentError::QualityGate {
                            label: request.label.clone(),
                            level,
                            floor: self.options.quality_floor,
                            score,
                        });
                    }
                    tracing::warn!(
                        label = %request.label,
                        %level,
                        score,
                        "segment quality below the configured floor"
                    );
                    quality_warning = true;
                }
            }
            Some(metrics)
        } else {
            None
        };

        Ok(SegmentOutcome {
            buffer: segment,
            label: request.label.clone(),
            start_sample: start,
            end_sample: end,
            duration_ms: (end - start) as f64 / f64::from(source.sample_rate()) * 1000.0,
            metrics,
            quality_warning,
        })
    }

    /// Processes every request against `source`, collecting per-segment
    /// results.
    ///
    /// A failing segment is recorded and processing continues with the next
    /// request.
    #[cfg(feature = "batch-processing")]
    pub fn process_batch<T: RealFloat>(
        &self,
        source: &SampleBuffer<T>,
        requests: &[SegmentRequest],
    ) -> BatchOutcome<T> {
        let cancel = AtomicBool::new(false);
        self.process_batch_with_cancel(source, requests, &cancel)
    }

    /// Like [`Self::process_batch`], checking `cancel` between segments.
    ///
    /// Cancellation is cooperative: a segment already being processed runs
    /// to completion, and no further requests are started. Results produced
    /// before cancellation are returned.
    #[cfg(feature = "batch-processing")]
    pub fn process_batch_with_cancel<T: RealFloat>(
        &self,
        source: &SampleBuffer<T>,
        requests: &[SegmentRequest],
        cancel: &AtomicBool,
    ) -> BatchOutcome<T> {
        let mut outcomes = Vec::with_capacity(requests.len());
        let mut cancelled = false;
        for request in requests {
            if cancel.load(Ordering::Relaxed) {
                tracing::info!(
                    completed = outcomes.len(),
                    remaining = requests.len() - outcomes.len(),
                    "batch cancelled"
                );
                cancelled = true;
                break;
            }
            let result = self.process_segment(source, request);
            if let Err(error) = &result {
                tracing::warn!(label = %request.label, %error, "segment failed");
            }
            outcomes.push(result);
        }
        BatchOutcome { outcomes, cancelled }
    }
}
