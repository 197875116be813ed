//! Threshold profiles and processing options.
//!
//! Everything here is plain data: a profile is resolved into a
//! [`QualityThresholds`] value once per operation and passed explicitly to
//! the components that need it. There is no process-wide settings state.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::metrics::QualityLevel;
use crate::{AudioQualityError, AudioQualityResult};

/// Predefined quality profiles for different use cases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityProfile {
    /// Maximum quality: professional studio mastering.
    Studio,
    /// High quality: broadcast and production work.
    #[default]
    Professional,
    /// Good quality: consumer electronics.
    Standard,
    /// Acceptable quality: web streaming.
    Basic,
    /// User-defined thresholds.
    Custom,
}

/// Concrete threshold table consumed by the classifier and artifact detector.
///
/// Tier values follow professional audio conventions: THD+N tiers are
/// negative dB (more negative is better), SNR tiers are positive dB (higher
/// is better). The defaults correspond to the [`QualityProfile::Standard`]
/// acceptance floor of −40 dB THD+N / 70 dB SNR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    /// THD+N at or below this is studio-mastering grade.
    pub thd_excellent_db: f64,
    /// THD+N at or below this is broadcast grade.
    pub thd_good_db: f64,
    /// THD+N at or below this is consumer grade; worse is poor.
    pub thd_acceptable_db: f64,

    /// SNR at or above this is high-end studio grade.
    pub snr_excellent_db: f64,
    /// SNR at or above this is professional grade.
    pub snr_good_db: f64,
    /// SNR at or above this is consumer grade; worse is poor.
    pub snr_acceptable_db: f64,

    /// Minimum dynamic-range preservation, in percent.
    pub dynamic_range_min_pct: f64,

    /// Maximum allowed ratio of peak memory delta to input file size.
    pub memory_limit_ratio: f64,
    /// Maximum allowed ratio of processing time to audio duration.
    pub processing_time_ratio: f64,

    /// Near-full-scale absolute sample value treated as digital clipping.
    pub clipping_threshold: f64,
    /// Absolute mean sample value treated as DC offset.
    pub dc_offset_threshold: f64,
    /// Fraction of the Nyquist frequency above which spectral energy is
    /// inspected for aliasing.
    pub aliasing_frequency_ratio: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            thd_excellent_db: -80.0,
            thd_good_db: -60.0,
            thd_acceptable_db: -40.0,
            snr_excellent_db: 100.0,
            snr_good_db: 90.0,
            snr_acceptable_db: 70.0,
            dynamic_range_min_pct: 95.0,
            memory_limit_ratio: 4.0,
            processing_time_ratio: 2.0,
            clipping_threshold: 0.99,
            dc_offset_threshold: 0.01,
            aliasing_frequency_ratio: 0.4,
        }
    }
}

impl QualityThresholds {
    /// Resolves a named profile into a concrete threshold table.
    ///
    /// Each profile shifts the THD+N and SNR tier ladders so that the
    /// profile's acceptance floor becomes the `acceptable` tier, and sets the
    /// matching dynamic-range minimum. [`QualityProfile::Custom`] returns the
    /// defaults; callers supply their own values via [`Self::custom`] or
    /// struct update syntax.
    pub fn for_profile(profile: QualityProfile) -> Self {
        let defaults = Self::default();
        match profile {
            QualityProfile::Studio => Self {
                thd_excellent_db: -120.0,
                thd_good_db: -100.0,
                thd_acceptable_db: -80.0,
                snr_excellent_db: 130.0,
                snr_good_db: 120.0,
                snr_acceptable_db: 100.0,
                dynamic_range_min_pct: 98.0,
                ..defaults
            },
            QualityProfile::Professional => Self {
                thd_excellent_db: -100.0,
                thd_good_db: -80.0,
                thd_acceptable_db: -60.0,
                snr_excellent_db: 120.0,
                snr_good_db: 110.0,
                snr_acceptable_db: 90.0,
                dynamic_range_min_pct: 95.0,
                ..defaults
            },
            QualityProfile::Standard => Self {
                dynamic_range_min_pct: 90.0,
                ..defaults
            },
            QualityProfile::Basic => Self {
                thd_excellent_db: -70.0,
                thd_good_db: -50.0,
                thd_acceptable_db: -30.0,
                snr_excellent_db: 90.0,
                snr_good_db: 80.0,
                snr_acceptable_db: 60.0,
                dynamic_range_min_pct: 80.0,
                ..defaults
            },
            QualityProfile::Custom => defaults,
        }
    }

    /// Builds a custom table from acceptance floors, keeping the default tier
    /// spacing (20 dB between THD+N tiers, 30/20 dB above the SNR floor).
    pub fn custom(thd_floor_db: f64, snr_floor_db: f64, dynamic_range_min_pct: f64) -> Self {
        Self {
            thd_excellent_db: thd_floor_db - 40.0,
            thd_good_db: thd_floor_db - 20.0,
            thd_acceptable_db: thd_floor_db,
            snr_excellent_db: snr_floor_db + 30.0,
            snr_good_db: snr_floor_db + 20.0,
            snr_acceptable_db: snr_floor_db,
            dynamic_range_min_pct,
            ..Self::default()
        }
    }

    /// Checks the table for internal consistency.
    ///
    /// A malformed table aborts the whole run (every classification against
    /// it would be wrong), so this runs once when an analyzer or pipeline is
    /// constructed.
    pub fn validate(&self) -> AudioQualityResult<()> {
        if !(self.thd_excellent_db <= self.thd_good_db
            && self.thd_good_db <= self.thd_acceptable_db)
        {
            return Err(AudioQualityError::InvalidThresholds(format!(
                "THD+N tiers must be ordered excellent <= good <= acceptable, got {} / {} / {}",
                self.thd_excellent_db, self.thd_good_db, self.thd_acceptable_db
            )));
        }
        if !(self.snr_excellent_db >= self.snr_good_db
            && self.snr_good_db >= self.snr_acceptable_db)
        {
            return Err(AudioQualityError::InvalidThresholds(format!(
                "SNR tiers must be ordered excellent >= good >= acceptable, got {} / {} / {}",
                self.snr_excellent_db, self.snr_good_db, self.snr_acceptable_db
            )));
        }
        if !(self.dynamic_range_min_pct > 0.0 && self.dynamic_range_min_pct <= 100.0) {
            return Err(AudioQualityError::InvalidThresholds(format!(
                "Dynamic range minimum must be in (0, 100], got {}",
                self.dynamic_range_min_pct
            )));
        }
        if self.memory_limit_ratio <= 0.0 || self.processing_time_ratio <= 0.0 {
            return Err(AudioQualityError::InvalidThresholds(
                "Performance ratios must be positive".to_string(),
            ));
        }
        if !(self.clipping_threshold > 0.0 && self.clipping_threshold <= 1.0) {
            return Err(AudioQualityError::InvalidThresholds(format!(
                "Clipping threshold must be in (0, 1], got {}",
                self.clipping_threshold
            )));
        }
        if !(self.aliasing_frequency_ratio > 0.0 && self.aliasing_frequency_ratio < 1.0)
            || self.dc_offset_threshold <= 0.0
        {
            return Err(AudioQualityError::InvalidThresholds(
                "Artifact detection thresholds out of range".to_string(),
            ));
        }
        Ok(())
    }

    /// Deserializes a table from a JSON string and validates it.
    pub fn from_json(json: &str) -> AudioQualityResult<Self> {
        let thresholds: Self = serde_json::from_str(json)?;
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Loads a table from a JSON file and validates it.
    pub fn from_json_file(path: &Path) -> AudioQualityResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| AudioQualityError::InvalidThresholds(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Serializes the table to pretty-printed JSON.
    pub fn to_json(&self) -> AudioQualityResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Per-invocation options for segment extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentOptions {
    /// Apply symmetric Hann fades at segment edges.
    pub fade_enabled: bool,
    /// Add TPDF dither after fading.
    pub dither_enabled: bool,
    /// Run quality validation against the untouched reference slice.
    pub quality_validation: bool,

    /// Fade-in/fade-out duration in milliseconds.
    pub fade_duration_ms: f64,
    /// Peak amplitude of each uniform component of the triangular dither.
    pub dither_amplitude: f64,
    /// Zero-crossing search window around each nominal boundary, in
    /// milliseconds.
    pub boundary_window_ms: f64,

    /// Classification level below which the quality gate reacts.
    pub quality_floor: QualityLevel,
    /// Promote a quality-gate miss from a warning to a per-segment failure.
    pub fail_on_quality_gate: bool,

    /// Fixed dither RNG seed for reproducible output. `None` draws from
    /// entropy.
    pub dither_seed: Option<u64>,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            fade_enabled: true,
            dither_enabled: true,
            quality_validation: true,
            fade_duration_ms: 10.0,
            dither_amplitude: 1e-6,
            boundary_window_ms: 5.0,
            quality_floor: QualityLevel::Acceptable,
            fail_on_quality_gate: false,
            dither_seed: None,
        }
    }
}

impl SegmentOptions {
    /// Checks option values for basic sanity.
    pub fn validate(&self) -> AudioQualityResult<()> {
        if self.fade_duration_ms < 0.0 {
            return Err(AudioQualityError::InvalidParameter(
                "Fade duration cannot be negative".to_string(),
            ));
        }
        if self.dither_amplitude < 0.0 {
            return Err(AudioQualityError::InvalidParameter(
                "Dither amplitude cannot be negative".to_string(),
            ));
        }
        if self.boundary_window_ms < 0.0 {
            return Err(AudioQualityError::InvalidParameter(
                "Boundary search window cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_validate() {
        QualityThresholds::default().validate().expect("defaults are consistent");
        for profile in [
            QualityProfile::Studio,
            QualityProfile::Professional,
            QualityProfile::Standard,
            QualityProfile::Basic,
            QualityProfile::Custom,
        ] {
            QualityThresholds::for_profile(profile)
                .validate()
                .expect("profile tables are consistent");
        }
    }

    #[test]
    fn test_profile_floors() {
        let studio = QualityThresholds::for_profile(QualityProfile::Studio);
        assert_eq!(studio.thd_acceptable_db, -80.0);
        assert_eq!(studio.snr_acceptable_db, 100.0);
        assert_eq!(studio.dynamic_range_min_pct, 98.0);

        let basic = QualityThresholds::for_profile(QualityProfile::Basic);
        assert_eq!(basic.thd_acceptable_db, -30.0);
        assert_eq!(basic.snr_acceptable_db, 60.0);
        assert_eq!(basic.dynamic_range_min_pct, 80.0);
    }

    #[test]
    fn test_misordered_tiers_rejected() {
        let bad = QualityThresholds {
            thd_excellent_db: -40.0,
            thd_good_db: -60.0,
            ..QualityThresholds::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(AudioQualityError::InvalidThresholds(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let original = QualityThresholds::for_profile(QualityProfile::Professional);
        let json = original.to_json().expect("serializes");
        let restored = QualityThresholds::from_json(&json).expect("deserializes");
        assert_eq!(original, restored);
    }

    #[test]
    fn test_json_rejects_malformed_table() {
        let json = r#"{"thd_excellent_db": -10.0, "thd_good_db": -60.0}"#;
        assert!(QualityThresholds::from_json(json).is_err());
    }

    #[test]
    fn test_custom_floor_spacing() {
        let custom = QualityThresholds::custom(-50.0, 75.0, 92.0);
        assert_eq!(custom.thd_acceptable_db, -50.0);
        assert_eq!(custom.thd_good_db, -70.0);
        assert_eq!(custom.snr_excellent_db, 105.0);
        custom.validate().expect("custom table is consistent");
    }

    #[test]
    fn test_segment_options_defaults() {
        let options = SegmentOptions::default();
        assert!(options.fade_enabled);
        assert!(options.dither_enabled);
        assert!(options.quality_validation);
        assert_eq!(options.fade_duration_ms, 10.0);
        assert_eq!(options.dither_amplitude, 1e-6);
        assert_eq!(options.boundary_window_ms, 5.0);
        options.validate().expect("defaults are sane");
    }

    #[test]
    fn test_negative_fade_rejected() {
        let options = SegmentOptions {
            fade_duration_ms: -1.0,
            ..SegmentOptions::default()
        };
        assert!(options.validate().is_err());
    }
}
