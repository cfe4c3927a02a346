//! In-process [`AirQualityStore`] with the same selection semantics as the
//! `DuckDB` store. Used for deterministic tests and demos.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use wildfire_aq_database_models::{
    BoundingBox, FireEventRecord, RawFireEvent, RawReading, RawValue, ReadingRecord, TimeWindow,
};

use crate::{AirQualityStore, StoreError};

#[derive(Debug, Clone)]
struct StoredReading {
    station: String,
    measured_at: NaiveDateTime,
    value: Option<RawValue>,
}

/// Store holding rows in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    readings: Vec<StoredReading>,
    fires: Vec<FireEventRecord>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from import records.
    #[must_use]
    pub fn from_records(readings: Vec<ReadingRecord>, fires: Vec<FireEventRecord>) -> Self {
        let mut store = Self::new();
        for record in readings {
            store.push_reading(&record.station, record.measured_at, record.pm25.map(RawValue::Text));
        }
        store.fires = fires;
        store
    }

    /// Adds one pollutant measurement.
    pub fn push_reading(
        &mut self,
        station: &str,
        measured_at: NaiveDateTime,
        value: Option<RawValue>,
    ) {
        self.readings.push(StoredReading {
            station: station.to_string(),
            measured_at,
            value,
        });
    }

    /// Adds one fire detection.
    pub fn push_fire(&mut self, detected_at: NaiveDateTime, latitude: f64, longitude: f64) {
        self.fires.push(FireEventRecord {
            detected_at,
            latitude,
            longitude,
        });
    }
}

fn day_string(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%d").to_string()
}

#[async_trait]
impl AirQualityStore for MemoryStore {
    async fn fetch_pollutant_series(
        &self,
        station: &str,
        window: TimeWindow,
    ) -> Result<Vec<RawReading>, StoreError> {
        let mut rows: Vec<&StoredReading> = self
            .readings
            .iter()
            .filter(|r| r.station == station && window.contains(r.measured_at))
            .collect();
        rows.sort_by_key(|r| r.measured_at);

        Ok(rows
            .into_iter()
            .map(|r| RawReading {
                date: Some(day_string(r.measured_at)),
                value: r.value.clone(),
            })
            .collect())
    }

    async fn fetch_fire_events(
        &self,
        bbox: BoundingBox,
        window: TimeWindow,
    ) -> Result<Vec<RawFireEvent>, StoreError> {
        Ok(self
            .fires
            .iter()
            .filter(|f| window.contains(f.detected_at) && bbox.contains(f.latitude, f.longitude))
            .map(|f| RawFireEvent {
                date: Some(day_string(f.detected_at)),
                latitude: Some(f.latitude),
                longitude: Some(f.longitude),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn ts(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn window() -> TimeWindow {
        TimeWindow::for_days(
            NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 3).unwrap(),
        )
    }

    #[tokio::test]
    async fn selects_station_rows_in_window_sorted() {
        let mut store = MemoryStore::new();
        store.push_reading("ibirapuera", ts(3, 23), Some(RawValue::Number(2.0)));
        store.push_reading("ibirapuera", ts(2, 0), Some(RawValue::Number(1.0)));
        store.push_reading("ibirapuera", ts(4, 0), Some(RawValue::Number(3.0)));
        store.push_reading("mooca", ts(2, 5), Some(RawValue::Number(9.0)));

        let rows = store.fetch_pollutant_series("ibirapuera", window()).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date.as_deref(), Some("2024-07-02"));
        assert_eq!(rows[1].value, Some(RawValue::Number(2.0)));
    }

    #[tokio::test]
    async fn selects_fires_in_box_and_window() {
        let mut store = MemoryStore::new();
        store.push_fire(ts(2, 12), -23.5, -46.6);
        store.push_fire(ts(2, 12), -10.0, -46.6);
        store.push_fire(ts(5, 12), -23.5, -46.6);

        let rows = store
            .fetch_fire_events(BoundingBox::new(-24.0, -23.0, -47.0, -46.0), window())
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].latitude, Some(-23.5));
    }
}
