//! Rayon-backed parallel batch extraction.
//!
//! Segments are independent reads of a shared immutable source, so a batch
//! parallelizes without synchronization. Output order matches request order
//! regardless of scheduling.

use rayon::prelude::*;

use crate::buffer::SampleBuffer;
use crate::segment::pipeline::{BatchOutcome, SegmentPipeline, SegmentRequest};
use crate::{AudioQualityError, AudioQualityResult, RealFloat};

/// Processes every request against `source` on a rayon thread pool.
///
/// `thread_count` of `None` uses one thread per available CPU core. Failing
/// segments are recorded in the outcome like in the sequential batch.
///
/// # Errors
/// Returns [`AudioQualityError::InvalidParameter`] if the thread pool cannot
/// be built.
pub fn process_batch_parallel<T: RealFloat>(
    pipeline: &SegmentPipeline,
    source: &SampleBuffer<T>,
    requests: &[SegmentRequest],
    thread_count: Option<usize>,
) -> AudioQualityResult<BatchOutcome<T>> {
    let threads = thread_count.unwrap_or_else(num_cpus::get);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| {
            AudioQualityError::InvalidParameter(format!("Thread pool creation failed: {e}"))
        })?;

    let outcomes = pool.install(|| {
        requests
            .par_iter()
            .map(|request| pipeline.process_segment(source, request))
            .collect()
    });

    Ok(BatchOutcome {
        outcomes,
        cancelled: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{QualityThresholds, SegmentOptions};
    use crate::utils::generation::sine_wave;
    use std::time::Duration;

    #[test]
    fn test_parallel_matches_request_order() {
        let source = sine_wave::<f64>(440.0, Duration::from_secs(2), 44100, 0.5);
        let pipeline =
            SegmentPipeline::new(SegmentOptions::default(), QualityThresholds::default())
                .expect("valid configuration");
        let requests: Vec<SegmentRequest> = (0..8)
            .map(|i| {
                let start = f64::from(i) * 200.0;
                SegmentRequest::new(start, start + 150.0, format!("part-{i}"))
            })
            .collect();

        let batch = process_batch_parallel(&pipeline, &source, &requests, Some(4))
            .expect("pool builds");
        assert_eq!(batch.outcomes.len(), requests.len());
        assert_eq!(batch.processed(), requests.len());
        for (outcome, request) in batch.outcomes.iter().zip(&requests) {
            assert_eq!(outcome.as_ref().expect("segment extracted").label, request.label);
        }
    }

    #[test]
    fn test_parallel_records_failures_in_place() {
        let source = sine_wave::<f64>(440.0, Duration::from_secs(1), 44100, 0.5);
        let pipeline =
            SegmentPipeline::new(SegmentOptions::default(), QualityThresholds::default())
                .expect("valid configuration");
        let requests = vec![
            SegmentRequest::new(0.0, 300.0, "ok"),
            SegmentRequest::new(500.0, 500.0, "bad"),
        ];

        let batch = process_batch_parallel(&pipeline, &source, &requests, None)
            .expect("pool builds");
        assert!(batch.outcomes[0].is_ok());
        assert!(batch.outcomes[1].is_err());
    }
}
