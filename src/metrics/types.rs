//! Quality metric records and assessment levels.

use serde::{Deserialize, Serialize};

/// Quality assessment levels based on professional audio standards.
///
/// The ordering is load-bearing: classification always clamps to the
/// *minimum* (worst) level implied by each independent check, so the variants
/// are declared worst-first and the derived `Ord` follows professional-grade
/// ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    /// Critical quality failure.
    Failed,
    /// Below acceptable standards.
    Poor,
    /// Consumer electronics quality (THD+N < −40 dB, SNR > 70 dB).
    Acceptable,
    /// Professional broadcast quality (THD+N < −60 dB, SNR > 90 dB).
    Good,
    /// Studio mastering quality (THD+N < −80 dB, SNR > 100 dB).
    Excellent,
}

impl QualityLevel {
    /// Lowercase name, matching the serialized form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            QualityLevel::Failed => "failed",
            QualityLevel::Poor => "poor",
            QualityLevel::Acceptable => "acceptable",
            QualityLevel::Good => "good",
            QualityLevel::Excellent => "excellent",
        }
    }
}

impl std::fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scientific audio quality metrics following professional standards.
///
/// Every measurement field is optional: `None` means the computation was not
/// applicable for this analysis (for example no reference buffer was
/// supplied), which is distinct from a value that was measured as zero.
/// Classification skips checks whose inputs are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Total Harmonic Distortion + Noise in dB (more negative is better).
    pub thd_plus_n_db: Option<f64>,
    /// Signal-to-Noise Ratio in dB (higher is better).
    pub snr_db: Option<f64>,
    /// Dynamic-range preservation relative to the reference, in percent.
    pub dynamic_range_pct: Option<f64>,

    /// Peak level in dBFS.
    pub peak_level_db: Option<f64>,
    /// RMS level in dBFS.
    pub rms_level_db: Option<f64>,
    /// Crest factor (peak minus RMS) in dB.
    pub crest_factor_db: Option<f64>,

    /// Any artifact detector fired.
    pub artifacts_detected: bool,
    /// Peak sample at or above the digital full-scale threshold.
    pub clipping_detected: bool,
    /// Suspicious high-frequency energy near the Nyquist frequency.
    pub aliasing_detected: bool,
    /// Non-zero mean sample value.
    pub dc_offset_detected: bool,

    /// Wall-clock time spent inside the analysis, in milliseconds.
    pub processing_time_ms: Option<f64>,
    /// Peak memory delta attributed to the operation, in MiB
    /// (caller-supplied; this crate does not sample process memory).
    pub memory_usage_mb: Option<f64>,
    /// Size of the output artifact, in MiB (caller-supplied).
    pub file_size_mb: Option<f64>,

    /// Overall quality rating.
    pub quality_level: Option<QualityLevel>,
    /// Numerical score in [0, 100].
    pub quality_score: Option<f64>,

    /// Sample rate of the analyzed buffer.
    pub sample_rate: Option<u32>,
    /// Channel count of the analyzed buffer.
    pub channels: Option<usize>,
    /// Duration of the analyzed buffer in seconds.
    pub duration_seconds: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering_is_worst_first() {
        assert!(QualityLevel::Failed < QualityLevel::Poor);
        assert!(QualityLevel::Poor < QualityLevel::Acceptable);
        assert!(QualityLevel::Acceptable < QualityLevel::Good);
        assert!(QualityLevel::Good < QualityLevel::Excellent);
        assert_eq!(
            QualityLevel::Excellent.min(QualityLevel::Acceptable),
            QualityLevel::Acceptable
        );
    }

    #[test]
    fn test_default_metrics_are_absent_not_zero() {
        let metrics = QualityMetrics::default();
        assert!(metrics.thd_plus_n_db.is_none());
        assert!(metrics.snr_db.is_none());
        assert!(metrics.quality_level.is_none());
        assert!(!metrics.artifacts_detected);
    }

    #[test]
    fn test_level_serialization_names() {
        let json = serde_json::to_string(&QualityLevel::Excellent).expect("serializes");
        assert_eq!(json, "\"excellent\"");
        assert_eq!(QualityLevel::Excellent.to_string(), "excellent");
    }
}
