#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Data store collaborator for pollutant readings and fire detections.
//!
//! The pipeline only sees the [`AirQualityStore`] trait. [`store_db`]
//! implements it on top of a `DuckDB` file, opening a fresh read-only
//! connection per call; [`memory`] implements it in-process for tests and
//! demos. [`import`] loads CSV exports into the `DuckDB` file.

pub mod import;
pub mod memory;
pub mod parsing;
pub mod paths;
pub mod store_db;

use async_trait::async_trait;
use wildfire_aq_database_models::{BoundingBox, RawFireEvent, RawReading, TimeWindow};

/// Errors that can occur during data store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// `DuckDB` query or connection error.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// I/O error (file read/write, directory creation).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV import error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The store cannot be reached (missing file, failed connection).
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Description of what went wrong.
        message: String,
    },

    /// A blocking store worker panicked or was cancelled.
    #[error("Store worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Read access to pollutant readings and fire detections.
///
/// Implementations acquire whatever handle they need per call (or pool it
/// internally); callers hold no connection state between requests.
#[async_trait]
pub trait AirQualityStore: Send + Sync {
    /// Returns the pollutant rows recorded for `station` inside `window`,
    /// ordered by date.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be queried.
    async fn fetch_pollutant_series(
        &self,
        station: &str,
        window: TimeWindow,
    ) -> Result<Vec<RawReading>, StoreError>;

    /// Returns the fire detections inside `bbox` and `window`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be queried.
    async fn fetch_fire_events(
        &self,
        bbox: BoundingBox,
        window: TimeWindow,
    ) -> Result<Vec<RawFireEvent>, StoreError>;
}

/// Formats a timestamp the way the `DuckDB` schema stores it.
pub(crate) fn format_timestamp(ts: chrono::NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}
