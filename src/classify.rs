//! Quality classification: maps a measured [`QualityMetrics`] record to an
//! overall level and a numerical score.
//!
//! Classification is a pure function of the metrics and a threshold table.
//! Metrics that are absent (`None`) simply skip their check; they never count
//! against the result. [`QualityLevel::Failed`] is reserved for hard
//! operational failures upstream and is never produced here.

use crate::config::QualityThresholds;
use crate::metrics::{QualityMetrics, QualityLevel};

/// Tier score for a THD+N measurement (lower dB is better).
fn thd_tier_score(thd_db: f64, thresholds: &QualityThresholds) -> f64 {
    if thd_db <= thresholds.thd_excellent_db {
        100.0
    } else if thd_db <= thresholds.thd_good_db {
        80.0
    } else if thd_db <= thresholds.thd_acceptable_db {
        60.0
    } else {
        30.0
    }
}

/// Tier score for an SNR measurement (higher dB is better).
fn snr_tier_score(snr_db: f64, thresholds: &QualityThresholds) -> f64 {
    if snr_db >= thresholds.snr_excellent_db {
        100.0
    } else if snr_db >= thresholds.snr_good_db {
        80.0
    } else if snr_db >= thresholds.snr_acceptable_db {
        60.0
    } else {
        30.0
    }
}

/// Ratio of peak memory delta to output size, when both figures are present
/// and meaningful.
fn memory_ratio(metrics: &QualityMetrics) -> Option<f64> {
    match (metrics.memory_usage_mb, metrics.file_size_mb) {
        (Some(memory), Some(file)) if memory != 0.0 && file != 0.0 => Some(memory / file),
        _ => None,
    }
}

/// Ratio of processing time to audio duration, when both are present and
/// meaningful.
fn time_ratio(metrics: &QualityMetrics) -> Option<f64> {
    match (metrics.processing_time_ms, metrics.duration_seconds) {
        (Some(time_ms), Some(duration)) if time_ms != 0.0 && duration != 0.0 => {
            Some(time_ms / 1000.0 / duration)
        }
        _ => None,
    }
}

/// Overall quality level for `metrics` under `thresholds`.
///
/// Starts from [`QualityLevel::Excellent`] and clamps downward for each
/// independent finding:
///
/// * THD+N or SNR landing in a lower tier clamps to that tier's level, and
///   past the acceptable floor to [`QualityLevel::Poor`];
/// * any detected artifact clamps to [`QualityLevel::Acceptable`];
/// * an exceeded memory or processing-time budget clamps to
///   [`QualityLevel::Acceptable`].
///
/// The clamps commute, so check order never changes the result.
fn assess_level(metrics: &QualityMetrics, thresholds: &QualityThresholds) -> QualityLevel {
    let mut level = QualityLevel::Excellent;

    if let Some(thd) = metrics.thd_plus_n_db {
        if thd > thresholds.thd_acceptable_db {
            level = level.min(QualityLevel::Poor);
        } else if thd > thresholds.thd_good_db {
            level = level.min(QualityLevel::Acceptable);
        } else if thd > thresholds.thd_excellent_db {
            level = level.min(QualityLevel::Good);
        }
    }

    if let Some(snr) = metrics.snr_db {
        if snr < thresholds.snr_acceptable_db {
            level = level.min(QualityLevel::Poor);
        } else if snr < thresholds.snr_good_db {
            level = level.min(QualityLevel::Acceptable);
        } else if snr < thresholds.snr_excellent_db {
            level = level.min(QualityLevel::Good);
        }
    }

    if metrics.artifacts_detected {
        level = level.min(QualityLevel::Acceptable);
    }

    if memory_ratio(metrics).is_some_and(|r| r > thresholds.memory_limit_ratio) {
        level = level.min(QualityLevel::Acceptable);
    }
    if time_ratio(metrics).is_some_and(|r| r > thresholds.processing_time_ratio) {
        level = level.min(QualityLevel::Acceptable);
    }

    level
}

/// Numerical quality score in [0, 100] for `metrics` under `thresholds`.
///
/// Starts from 100 and blends in the THD+N tier score at 40% weight, then the
/// SNR tier score at 30% weight of the running total; detected artifacts
/// multiply by 0.8, and an exceeded memory budget costs a further penalty.
/// The blend order is part of the contract and must not be reordered.
fn score(metrics: &QualityMetrics, thresholds: &QualityThresholds) -> f64 {
    let mut score = 100.0;

    if let Some(thd) = metrics.thd_plus_n_db {
        score = score * 0.6 + thd_tier_score(thd, thresholds) * 0.4;
    }
    if let Some(snr) = metrics.snr_db {
        score = score * 0.7 + snr_tier_score(snr, thresholds) * 0.3;
    }
    if metrics.artifacts_detected {
        score *= 0.8;
    }

    let performance_factor =
        if memory_ratio(metrics).is_some_and(|r| r > thresholds.memory_limit_ratio) {
            0.9
        } else {
            1.0
        };
    score *= 0.9 + performance_factor * 0.1;

    score.clamp(0.0, 100.0)
}

/// Classifies `metrics`, returning the overall level and the numerical score.
pub fn classify(
    metrics: &QualityMetrics,
    thresholds: &QualityThresholds,
) -> (QualityLevel, f64) {
    let level = assess_level(metrics, thresholds);
    let score = score(metrics, thresholds);
    tracing::trace!(%level, score, "classified quality metrics");
    (level, score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    fn metrics(thd_db: f64, snr_db: f64) -> QualityMetrics {
        QualityMetrics {
            thd_plus_n_db: Some(thd_db),
            snr_db: Some(snr_db),
            ..QualityMetrics::default()
        }
    }

    #[test]
    fn test_clean_metrics_are_excellent() {
        let thresholds = QualityThresholds::default();
        let (level, score) = classify(&metrics(-100.0, 120.0), &thresholds);
        assert_eq!(level, QualityLevel::Excellent);
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_tier_boundaries_are_inclusive() {
        let thresholds = QualityThresholds::default();
        // Exactly on the excellent tier stays excellent; just past it drops
        // one level.
        let (level, _) = classify(&metrics(-80.0, 100.0), &thresholds);
        assert_eq!(level, QualityLevel::Excellent);
        let (level, _) = classify(&metrics(-79.9, 100.0), &thresholds);
        assert_eq!(level, QualityLevel::Good);
    }

    #[test]
    fn test_worst_finding_wins() {
        let thresholds = QualityThresholds::default();
        // Excellent THD+N cannot lift a poor SNR, and vice versa.
        let (level, _) = classify(&metrics(-100.0, 50.0), &thresholds);
        assert_eq!(level, QualityLevel::Poor);
        let (level, _) = classify(&metrics(-20.0, 120.0), &thresholds);
        assert_eq!(level, QualityLevel::Poor);
    }

    #[test]
    fn test_artifacts_clamp_to_acceptable() {
        let thresholds = QualityThresholds::default();
        let mut m = metrics(-100.0, 120.0);
        m.artifacts_detected = true;
        let (level, score) = classify(&m, &thresholds);
        assert_eq!(level, QualityLevel::Acceptable);
        // 100 blended twice with perfect tier scores stays 100, then the
        // artifact penalty takes 20%.
        assert_approx_eq!(score, 80.0, 1e-9);
    }

    #[test]
    fn test_artifacts_do_not_lift_a_poor_level() {
        let thresholds = QualityThresholds::default();
        let mut m = metrics(-20.0, 50.0);
        m.artifacts_detected = true;
        let (level, _) = classify(&m, &thresholds);
        assert_eq!(level, QualityLevel::Poor);
    }

    #[test]
    fn test_memory_budget_clamp_and_penalty() {
        let thresholds = QualityThresholds::default();
        let mut m = metrics(-100.0, 120.0);
        m.memory_usage_mb = Some(50.0);
        m.file_size_mb = Some(10.0);
        let (level, score) = classify(&m, &thresholds);
        assert_eq!(level, QualityLevel::Acceptable);
        assert_approx_eq!(score, 99.0, 1e-9);
    }

    #[test]
    fn test_time_budget_clamps_level_only() {
        let thresholds = QualityThresholds::default();
        let mut m = metrics(-100.0, 120.0);
        m.processing_time_ms = Some(30_000.0);
        m.duration_seconds = Some(10.0);
        let (level, score) = classify(&m, &thresholds);
        assert_eq!(level, QualityLevel::Acceptable);
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_absent_metrics_skip_their_checks() {
        let thresholds = QualityThresholds::default();
        let (level, score) = classify(&QualityMetrics::default(), &thresholds);
        assert_eq!(level, QualityLevel::Excellent);
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_score_blend_order() {
        let thresholds = QualityThresholds::default();
        // THD+N in the good tier (80), SNR in the acceptable tier (60):
        // 100*0.6 + 80*0.4 = 92, then 92*0.7 + 60*0.3 = 82.4.
        let (_, score) = classify(&metrics(-70.0, 80.0), &thresholds);
        assert_approx_eq!(score, 82.4, 1e-9);
    }

    #[test]
    fn test_worst_case_score_stays_in_range() {
        let thresholds = QualityThresholds::default();
        let mut m = metrics(0.0, 0.0);
        m.artifacts_detected = true;
        m.memory_usage_mb = Some(100.0);
        m.file_size_mb = Some(1.0);
        let (level, score) = classify(&m, &thresholds);
        assert_eq!(level, QualityLevel::Poor);
        assert!((0.0..=100.0).contains(&score));
        assert_ne!(level, QualityLevel::Failed);
    }
}
