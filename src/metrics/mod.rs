//! Objective quality measurement.
//!
//! Split into the metric engine ([`engine`]), artifact detection
//! ([`artifacts`]) and the shared FFT and filter helpers they are built on.

pub mod artifacts;
pub mod engine;
pub(crate) mod filter;
pub(crate) mod spectrum;
pub mod types;

pub use artifacts::{ArtifactReport, detect_aliasing, detect_clipping, detect_dc_offset};
pub use engine::{
    QualityAnalyzer, dynamic_range_preservation, estimate_snr_db, estimate_thd_plus_n_db,
    peak_level_db, rms_level_db, snr_db, thd_plus_n_db,
};
pub use types::{QualityLevel, QualityMetrics};
