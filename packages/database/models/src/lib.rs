#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Boundary record types exchanged with the air-quality data store.
//!
//! The store holds loosely typed documents: pollutant values may arrive as
//! numbers or text, dates as day strings or timestamps, and any field may
//! be missing. These types carry that looseness up to the pipeline, which
//! coerces them into the typed analysis records and drops what it cannot
//! use. They are distinct from the analysis types in
//! `wildfire_aq_analytics_models`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

pub use wildfire_aq_geography_models::BoundingBox;

/// A closed timestamp interval used to select store rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive lower bound.
    pub start: NaiveDateTime,
    /// Inclusive upper bound.
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Builds the window covering whole calendar days `start..=end`, from
    /// midnight of `start` through the last microsecond of `end`.
    #[must_use]
    pub fn for_days(start: NaiveDate, end: NaiveDate) -> Self {
        let end_of_day =
            NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN);
        Self {
            start: start.and_time(NaiveTime::MIN),
            end: end.and_time(end_of_day),
        }
    }

    /// Returns `true` if `ts` falls inside the window (both ends inclusive).
    #[must_use]
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// A pollutant value as found in the store: numeric or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// A numeric value.
    Number(f64),
    /// A textual value that may or may not parse as a number.
    Text(String),
}

/// One pollutant measurement row before coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    /// Calendar day (`YYYY-MM-DD`) or timestamp text.
    pub date: Option<String>,
    /// PM2.5 concentration in µg/m³.
    pub value: Option<RawValue>,
}

/// One fire detection row before coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFireEvent {
    /// Calendar day (`YYYY-MM-DD`) or timestamp text.
    pub date: Option<String>,
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,
}

/// A pollutant measurement as loaded from an import file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingRecord {
    /// Station key (e.g. `"ibirapuera"`).
    pub station: String,
    /// Measurement timestamp.
    pub measured_at: NaiveDateTime,
    /// Raw PM2.5 text, kept as-is so the pipeline decides what is usable.
    pub pm25: Option<String>,
}

/// A fire detection as loaded from an import file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireEventRecord {
    /// Detection timestamp.
    pub detected_at: NaiveDateTime,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_covers_whole_end_day() {
        let window = TimeWindow::for_days(
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 8, 30).unwrap(),
        );

        let first = NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let last = NaiveDate::from_ymd_opt(2024, 8, 30)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        let after = NaiveDate::from_ymd_opt(2024, 8, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        assert!(window.contains(first));
        assert!(window.contains(last));
        assert!(!window.contains(after));
    }

    #[test]
    fn raw_value_deserializes_numbers_and_text() {
        let n: RawValue = serde_json::from_str("12.5").unwrap();
        let t: RawValue = serde_json::from_str("\"n/a\"").unwrap();
        assert_eq!(n, RawValue::Number(12.5));
        assert_eq!(t, RawValue::Text("n/a".to_string()));
    }
}
