#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Time-series stages of the fire / air-quality correlation pipeline.
//!
//! Each stage is a pure function over typed records:
//!
//! 1. [`aggregate`] counts radius-filtered fire detections per day.
//! 2. [`join`] averages pollutant readings per day and inner-joins them
//!    with the fire counts.
//! 3. [`detrend`] subtracts a centred 3-day moving average.
//! 4. [`correlation`] computes Pearson coefficients across day lags.
//!
//! [`hotspots`] and [`export`] produce the presentation outputs.

pub mod aggregate;
pub mod correlation;
pub mod detrend;
pub mod export;
pub mod hotspots;
pub mod join;

use thiserror::Error;

/// Errors that can occur while exporting or re-reading analysis results.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// CSV encoding or decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Writing an export failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An export file does not have the expected layout.
    #[error("Malformed export: {message}")]
    Malformed {
        /// Description of what went wrong.
        message: String,
    },
}
