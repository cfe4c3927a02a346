//! CSV import into the `DuckDB` store.
//!
//! Fire detections are read from `date,latitude,longitude` files and
//! pollutant readings from `station,date,pm25` files. Rows whose timestamp
//! or coordinates cannot be parsed are skipped and counted; PM2.5 text is
//! stored untouched so the pipeline applies its own coercion policy.

use std::path::Path;

use duckdb::Connection;
use serde::Deserialize;
use wildfire_aq_database_models::{FireEventRecord, ReadingRecord};

use crate::StoreError;
use crate::parsing::parse_timestamp;
use crate::store_db::{insert_fire_events, insert_readings};

/// Outcome of an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Rows written to the store.
    pub imported: u64,
    /// Rows skipped because a required field was missing or malformed.
    pub skipped: u64,
}

#[derive(Debug, Deserialize)]
struct FireCsvRow {
    date: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReadingCsvRow {
    station: Option<String>,
    date: Option<String>,
    pm25: Option<String>,
}

fn parse_coordinate(s: Option<&str>) -> Option<f64> {
    s?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn csv_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, StoreError> {
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?)
}

/// Parses fire detection rows from a CSV file.
///
/// # Errors
///
/// Returns [`StoreError`] if the file cannot be opened or is not valid CSV.
pub fn read_fire_events_csv(path: &Path) -> Result<(Vec<FireEventRecord>, u64), StoreError> {
    let mut reader = csv_reader(path)?;
    let mut records = Vec::new();
    let mut skipped = 0u64;

    for row in reader.deserialize::<FireCsvRow>() {
        let row = row?;
        let parsed = row.date.as_deref().and_then(parse_timestamp).zip(
            parse_coordinate(row.latitude.as_deref()).zip(parse_coordinate(row.longitude.as_deref())),
        );

        match parsed {
            Some((detected_at, (latitude, longitude))) => records.push(FireEventRecord {
                detected_at,
                latitude,
                longitude,
            }),
            None => skipped += 1,
        }
    }

    Ok((records, skipped))
}

/// Parses pollutant reading rows from a CSV file.
///
/// # Errors
///
/// Returns [`StoreError`] if the file cannot be opened or is not valid CSV.
pub fn read_readings_csv(path: &Path) -> Result<(Vec<ReadingRecord>, u64), StoreError> {
    let mut reader = csv_reader(path)?;
    let mut records = Vec::new();
    let mut skipped = 0u64;

    for row in reader.deserialize::<ReadingCsvRow>() {
        let row = row?;
        let station = row.station.filter(|s| !s.is_empty());
        let measured_at = row.date.as_deref().and_then(parse_timestamp);

        match (station, measured_at) {
            (Some(station), Some(measured_at)) => records.push(ReadingRecord {
                station,
                measured_at,
                pm25: row.pm25.filter(|s| !s.is_empty()),
            }),
            _ => skipped += 1,
        }
    }

    Ok((records, skipped))
}

/// Loads a fire detection CSV into the store.
///
/// # Errors
///
/// Returns [`StoreError`] if reading the file or inserting fails.
pub fn import_fire_events_csv(conn: &Connection, path: &Path) -> Result<ImportStats, StoreError> {
    let (records, skipped) = read_fire_events_csv(path)?;
    let imported = insert_fire_events(conn, &records)?;
    log::info!(
        "Imported {imported} fire detections from {} ({skipped} rows skipped)",
        path.display()
    );
    Ok(ImportStats { imported, skipped })
}

/// Loads a pollutant reading CSV into the store.
///
/// # Errors
///
/// Returns [`StoreError`] if reading the file or inserting fails.
pub fn import_readings_csv(conn: &Connection, path: &Path) -> Result<ImportStats, StoreError> {
    let (records, skipped) = read_readings_csv(path)?;
    let imported = insert_readings(conn, &records)?;
    log::info!(
        "Imported {imported} pollutant readings from {} ({skipped} rows skipped)",
        path.display()
    );
    Ok(ImportStats { imported, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "wildfire_aq_import_{name}_{}.csv",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn parses_fires_and_skips_malformed_rows() {
        let path = write_temp(
            "fires",
            "date,latitude,longitude\n\
             2024-07-05 15:20:00,-23.1,-46.9\n\
             2024-07-06,-23.2,-47.0\n\
             not-a-date,-23.2,-47.0\n\
             2024-07-07,,-47.0\n",
        );

        let (records, skipped) = read_fire_events_csv(&path).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(skipped, 2);
        assert_eq!(records[1].detected_at.to_string(), "2024-07-06 00:00:00");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn keeps_raw_pm25_text() {
        let path = write_temp(
            "readings",
            "station,date,pm25\n\
             ibirapuera,2024-07-05,18.2\n\
             ibirapuera,2024-07-06,n/a\n\
             ibirapuera,2024-07-07,\n\
             ,2024-07-08,10\n",
        );

        let (records, skipped) = read_readings_csv(&path).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(skipped, 1);
        assert_eq!(records[0].pm25.as_deref(), Some("18.2"));
        assert_eq!(records[1].pm25.as_deref(), Some("n/a"));
        assert_eq!(records[2].pm25, None);

        let _ = std::fs::remove_file(&path);
    }
}
