//! Delimited-text and `GeoJSON` exports of an analysis.
//!
//! The lag table layout (`Lag,Correlation`) is consumed by existing
//! tooling and must not change.

use std::io::{Read, Write};

use chrono::NaiveDate;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::{Deserialize, Serialize};
use wildfire_aq_analytics_models::{Hotspot, JointRow, LagCorrelation};
use wildfire_aq_geography_models::GeoPoint;

use crate::AnalyticsError;

/// Header of the lag table export.
pub const LAG_CSV_HEADER: [&str; 2] = ["Lag", "Correlation"];

#[derive(Serialize, Deserialize)]
struct LagCsvRow {
    #[serde(rename = "Lag")]
    lag: u32,
    #[serde(rename = "Correlation")]
    correlation: f64,
}

#[derive(Serialize)]
struct JointCsvRow {
    date: NaiveDate,
    pm25: f64,
    fire_count: u32,
}

/// Writes the lag table as CSV, one row per entry in the given order.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if encoding or writing fails.
pub fn write_lag_csv<W: Write>(writer: W, table: &[LagCorrelation]) -> Result<(), AnalyticsError> {
    let mut wtr = csv::Writer::from_writer(writer);
    if table.is_empty() {
        wtr.write_record(LAG_CSV_HEADER)?;
    }
    for entry in table {
        wtr.serialize(LagCsvRow {
            lag: entry.lag,
            correlation: entry.correlation,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Parses a lag table written by [`write_lag_csv`].
///
/// # Errors
///
/// Returns [`AnalyticsError::Malformed`] if the header is not exactly
/// `Lag,Correlation`, or a CSV error if a row does not parse.
pub fn read_lag_csv<R: Read>(reader: R) -> Result<Vec<LagCorrelation>, AnalyticsError> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers()?;
    if headers.iter().ne(LAG_CSV_HEADER) {
        return Err(AnalyticsError::Malformed {
            message: format!(
                "expected header {}, found {}",
                LAG_CSV_HEADER.join(","),
                headers.iter().collect::<Vec<_>>().join(",")
            ),
        });
    }

    rdr.deserialize::<LagCsvRow>()
        .map(|row| {
            let row = row?;
            Ok(LagCorrelation {
                lag: row.lag,
                correlation: row.correlation,
            })
        })
        .collect()
}

/// Writes the raw joint series as `date,pm25,fire_count` CSV.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if encoding or writing fails.
pub fn write_joint_csv<W: Write>(writer: W, joint: &[JointRow]) -> Result<(), AnalyticsError> {
    let mut wtr = csv::Writer::from_writer(writer);
    if joint.is_empty() {
        wtr.write_record(["date", "pm25", "fire_count"])?;
    }
    for row in joint {
        wtr.serialize(JointCsvRow {
            date: row.date,
            pm25: row.pollutant,
            fire_count: row.fire_count,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

fn point_feature(latitude: f64, longitude: f64, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![longitude, latitude]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Builds a `FeatureCollection` with one point per hotspot and a final
/// point for the station.
#[must_use]
pub fn hotspots_feature_collection(
    station: &str,
    center: GeoPoint,
    mean_pm25: f64,
    hotspots: &[Hotspot],
) -> FeatureCollection {
    let mut features: Vec<Feature> = hotspots
        .iter()
        .map(|hotspot| {
            let mut props = JsonObject::new();
            props.insert("fire_count".to_string(), hotspot.count.into());
            props.insert(
                "mean_distance_km".to_string(),
                hotspot.mean_distance_km.into(),
            );
            point_feature(hotspot.latitude, hotspot.longitude, props)
        })
        .collect();

    let mut props = JsonObject::new();
    props.insert("station".to_string(), station.into());
    props.insert("mean_pm25".to_string(), mean_pm25.into());
    features.push(point_feature(center.latitude, center.longitude, props));

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Writes [`hotspots_feature_collection`] as pretty-printed `GeoJSON`.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if serialization or writing fails.
pub fn write_hotspots_geojson<W: Write>(
    writer: W,
    station: &str,
    center: GeoPoint,
    mean_pm25: f64,
    hotspots: &[Hotspot],
) -> Result<(), AnalyticsError> {
    let collection = hotspots_feature_collection(station, center, mean_pm25, hotspots);
    serde_json::to_writer_pretty(writer, &collection)?;
    Ok(())
}
