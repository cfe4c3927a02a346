#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Great-circle distance filtering around a monitoring station.
//!
//! Fire detections are selected in two stages: a cheap bounding-box test
//! that never rejects a point inside the radius, followed by the exact
//! Haversine cutoff. The station registry maps store keys to coordinates
//! and is embedded at compile time from TOML.

pub mod distance;
pub mod filter;
pub mod registry;

use thiserror::Error;

/// Errors that can occur during geographic filtering.
#[derive(Debug, Error)]
pub enum GeoError {
    /// The search radius is zero, negative, or not a number.
    #[error("Invalid radius: {radius_km} km (must be a positive number of kilometres)")]
    InvalidRadius {
        /// The rejected radius.
        radius_km: f64,
    },

    /// The query centre lies outside the WGS84 coordinate ranges.
    #[error("Invalid centre: lat={latitude}, lon={longitude}")]
    InvalidCenter {
        /// The rejected latitude.
        latitude: f64,
        /// The rejected longitude.
        longitude: f64,
    },
}
