#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Typed records flowing through the correlation pipeline.
//!
//! Every value here has already passed boundary coercion: dates are
//! calendar days, coordinates are finite WGS84 degrees, and pollutant
//! values are finite and non-negative. Nothing in this crate outlives a
//! single pipeline run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wildfire_aq_geography_models::{Located, Positioned};

/// A single fire detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireEvent {
    /// Calendar day of the detection.
    pub date: NaiveDate,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Positioned for FireEvent {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// A fire detection inside the query radius, with its distance to the
/// centre.
pub type FilteredFireEvent = Located<FireEvent>;

/// Number of fire detections on one calendar day. `count` is always at
/// least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyFireCount {
    /// Calendar day.
    pub date: NaiveDate,
    /// Detections on that day.
    pub count: u32,
}

/// One daily pollutant value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PollutantReading {
    /// Calendar day.
    pub date: NaiveDate,
    /// PM2.5 concentration in µg/m³.
    pub value: f64,
}

/// A day present in both the pollutant series and the fire counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JointRow {
    /// Calendar day.
    pub date: NaiveDate,
    /// Daily PM2.5 concentration in µg/m³.
    pub pollutant: f64,
    /// Fire detections on that day.
    pub fire_count: u32,
}

impl JointRow {
    /// Converts the row into a numeric series point.
    #[must_use]
    pub fn to_point(&self) -> SeriesPoint {
        SeriesPoint {
            date: self.date,
            pollutant: self.pollutant,
            fire_count: f64::from(self.fire_count),
        }
    }
}

/// A date-indexed pair of numeric values, raw or detrended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    /// Calendar day.
    pub date: NaiveDate,
    /// Pollutant value (or its deviation from the local trend).
    pub pollutant: f64,
    /// Fire count (or its deviation from the local trend).
    pub fire_count: f64,
}

/// Pearson correlation between fire counts and the pollutant series
/// shifted by `lag` days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LagCorrelation {
    /// Days between the fire count and the pollutant value it is paired
    /// with.
    pub lag: u32,
    /// Coefficient in `[-1, 1]`.
    pub correlation: f64,
}

/// Summary statistics of the raw (not detrended) joint series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSummary {
    /// Mean daily pollutant level over the joint days.
    pub mean_pollutant: f64,
    /// Same-day Pearson correlation, `None` when either series is constant.
    pub raw_correlation: Option<f64>,
    /// Number of days in the joint series.
    pub joint_days: usize,
    /// Number of fire detections inside the radius.
    pub fire_events: usize,
}

/// A location with repeated fire detections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Detections at this exact location.
    pub count: u32,
    /// Mean distance of those detections to the query centre.
    pub mean_distance_km: f64,
}
