//! Utility functions for audio processing.
//!
//! # Modules
//!
//! - [`generation`] - Test-signal generation utilities

pub mod generation;
