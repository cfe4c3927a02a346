//! `DuckDB`-backed air-quality store.
//!
//! A single `DuckDB` file holds an `air_quality` table (one row per station
//! measurement, PM2.5 kept as raw text) and a `fire_events` table (one row
//! per satellite fire detection). Reads open a fresh read-only connection
//! per call on a blocking worker so the async caller can bound them with a
//! timeout. Dropping the awaiting future interrupts the running query, so a
//! timed-out read does not keep the worker (and runtime shutdown) busy.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use duckdb::{AccessMode, Config, Connection, InterruptHandle};
use wildfire_aq_database_models::{
    BoundingBox, FireEventRecord, RawFireEvent, RawReading, RawValue, ReadingRecord, TimeWindow,
};

use crate::{AirQualityStore, StoreError, format_timestamp};

/// Number of rows per INSERT chunk (`DuckDB` handles large batches well).
const CHUNK_SIZE: usize = 5_000;

/// [`AirQualityStore`] backed by a `DuckDB` file.
#[derive(Debug, Clone)]
pub struct DuckDbStore {
    path: PathBuf,
}

impl DuckDbStore {
    /// Creates a store reading from the `DuckDB` file at `path`. The file
    /// is not opened until the first query.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the location given by `WILDFIRE_AQ_DB`, or the
    /// default `data/air_quality.duckdb`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(crate::paths::store_path_from_env())
    }

    /// Returns the path of the backing `DuckDB` file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AirQualityStore for DuckDbStore {
    async fn fetch_pollutant_series(
        &self,
        station: &str,
        window: TimeWindow,
    ) -> Result<Vec<RawReading>, StoreError> {
        let station = station.to_string();
        interruptible(self.path.clone(), move |conn| {
            query_pollutant_series(conn, &station, window)
        })
        .await
    }

    async fn fetch_fire_events(
        &self,
        bbox: BoundingBox,
        window: TimeWindow,
    ) -> Result<Vec<RawFireEvent>, StoreError> {
        interruptible(self.path.clone(), move |conn| {
            query_fire_events(conn, bbox, window)
        })
        .await
    }
}

/// Shared between an awaiting caller and the blocking worker running its
/// query.
#[derive(Default)]
struct Cancellation {
    cancelled: AtomicBool,
    handle: Mutex<Option<Arc<InterruptHandle>>>,
}

impl Cancellation {
    /// Records the worker's connection. Fails if the caller already gave up.
    fn register(&self, conn: &Connection) -> Result<(), StoreError> {
        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        *handle = Some(conn.interrupt_handle());
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                message: "query cancelled".to_string(),
            });
        }
        Ok(())
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = handle.as_ref() {
            log::debug!("Store: interrupting abandoned query");
            handle.interrupt();
        }
    }
}

/// Cancels the query unless disarmed once its result has been received.
struct CancelOnDrop(Option<Arc<Cancellation>>);

impl CancelOnDrop {
    fn disarm(&mut self) {
        self.0 = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(cancellation) = self.0.take() {
            cancellation.cancel();
        }
    }
}

/// Runs `query` on a fresh read-only connection on a blocking worker.
async fn interruptible<T, F>(path: PathBuf, query: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
{
    let cancellation = Arc::new(Cancellation::default());
    let mut guard = CancelOnDrop(Some(Arc::clone(&cancellation)));

    let result = tokio::task::spawn_blocking(move || {
        let conn = open_read_only(&path)?;
        cancellation.register(&conn)?;
        query(&conn)
    })
    .await?;

    guard.disarm();
    result
}

/// Opens (or creates) the store for writing and ensures the schema exists.
///
/// # Errors
///
/// Returns [`StoreError`] if the connection or schema creation fails.
pub fn open(path: &Path) -> Result<Connection, StoreError> {
    if let Some(parent) = path.parent() {
        crate::paths::ensure_dir(parent)?;
    }

    let conn = Connection::open(path)?;
    create_schema(&conn)?;

    Ok(conn)
}

/// Opens an existing store read-only.
///
/// # Errors
///
/// Returns [`StoreError::Unavailable`] if the file does not exist or the
/// connection cannot be established.
pub fn open_read_only(path: &Path) -> Result<Connection, StoreError> {
    if !path.exists() {
        return Err(StoreError::Unavailable {
            message: format!("no data store at {}", path.display()),
        });
    }

    let config = Config::default().access_mode(AccessMode::ReadOnly)?;
    Connection::open_with_flags(path, config).map_err(|e| StoreError::Unavailable {
        message: format!("failed to open {}: {e}", path.display()),
    })
}

fn create_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS air_quality (
            station TEXT NOT NULL,
            measured_at TIMESTAMP NOT NULL,
            pm25 TEXT
        );

        CREATE TABLE IF NOT EXISTS fire_events (
            detected_at TIMESTAMP NOT NULL,
            latitude DOUBLE NOT NULL,
            longitude DOUBLE NOT NULL
        );",
    )?;

    Ok(())
}

/// Inserts pollutant readings. Returns the number of rows inserted.
///
/// # Errors
///
/// Returns [`StoreError`] if any database operation fails.
pub fn insert_readings(conn: &Connection, records: &[ReadingRecord]) -> Result<u64, StoreError> {
    let mut total_inserted = 0u64;

    for chunk in records.chunks(CHUNK_SIZE) {
        let placeholders = vec!["(?, CAST(? AS TIMESTAMP), ?)"; chunk.len()].join(", ");
        let sql = format!("INSERT INTO air_quality (station, measured_at, pm25) VALUES {placeholders}");

        let mut stmt = conn.prepare(&sql)?;
        let mut param_idx = 1usize;

        for record in chunk {
            stmt.raw_bind_parameter(param_idx, &record.station)?;
            stmt.raw_bind_parameter(param_idx + 1, format_timestamp(record.measured_at))?;
            stmt.raw_bind_parameter(param_idx + 2, record.pm25.as_deref())?;
            param_idx += 3;
        }

        let rows = stmt.raw_execute()?;
        total_inserted += u64::try_from(rows).unwrap_or(0);
    }

    Ok(total_inserted)
}

/// Inserts fire detections. Returns the number of rows inserted.
///
/// # Errors
///
/// Returns [`StoreError`] if any database operation fails.
pub fn insert_fire_events(
    conn: &Connection,
    records: &[FireEventRecord],
) -> Result<u64, StoreError> {
    let mut total_inserted = 0u64;

    for chunk in records.chunks(CHUNK_SIZE) {
        let placeholders = vec!["(CAST(? AS TIMESTAMP), ?, ?)"; chunk.len()].join(", ");
        let sql = format!(
            "INSERT INTO fire_events (detected_at, latitude, longitude) VALUES {placeholders}"
        );

        let mut stmt = conn.prepare(&sql)?;
        let mut param_idx = 1usize;

        for record in chunk {
            stmt.raw_bind_parameter(param_idx, format_timestamp(record.detected_at))?;
            stmt.raw_bind_parameter(param_idx + 1, record.latitude)?;
            stmt.raw_bind_parameter(param_idx + 2, record.longitude)?;
            param_idx += 3;
        }

        let rows = stmt.raw_execute()?;
        total_inserted += u64::try_from(rows).unwrap_or(0);
    }

    Ok(total_inserted)
}

/// Selects the pollutant rows for one station inside the window, as day
/// strings and raw values, ordered by measurement time.
///
/// # Errors
///
/// Returns [`StoreError`] if the query fails.
pub fn query_pollutant_series(
    conn: &Connection,
    station: &str,
    window: TimeWindow,
) -> Result<Vec<RawReading>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT strftime(measured_at, '%Y-%m-%d') AS day, pm25
         FROM air_quality
         WHERE station = ?
           AND measured_at >= CAST(? AS TIMESTAMP)
           AND measured_at <= CAST(? AS TIMESTAMP)
         ORDER BY measured_at",
    )?;

    let rows = stmt.query_map(
        duckdb::params![
            station,
            format_timestamp(window.start),
            format_timestamp(window.end)
        ],
        |row| {
            Ok(RawReading {
                date: row.get::<_, Option<String>>(0)?,
                value: row.get::<_, Option<String>>(1)?.map(RawValue::Text),
            })
        },
    )?;

    let readings = rows.collect::<Result<Vec<_>, _>>()?;
    log::debug!("Store: {} pollutant rows for station {station}", readings.len());
    Ok(readings)
}

/// Selects the fire detections inside the bounding box and window.
///
/// # Errors
///
/// Returns [`StoreError`] if the query fails.
pub fn query_fire_events(
    conn: &Connection,
    bbox: BoundingBox,
    window: TimeWindow,
) -> Result<Vec<RawFireEvent>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT strftime(detected_at, '%Y-%m-%d') AS day, latitude, longitude
         FROM fire_events
         WHERE detected_at >= CAST(? AS TIMESTAMP)
           AND detected_at <= CAST(? AS TIMESTAMP)
           AND latitude BETWEEN ? AND ?
           AND longitude BETWEEN ? AND ?",
    )?;

    let rows = stmt.query_map(
        duckdb::params![
            format_timestamp(window.start),
            format_timestamp(window.end),
            bbox.lat_min,
            bbox.lat_max,
            bbox.lon_min,
            bbox.lon_max
        ],
        |row| {
            Ok(RawFireEvent {
                date: row.get::<_, Option<String>>(0)?,
                latitude: row.get::<_, Option<f64>>(1)?,
                longitude: row.get::<_, Option<f64>>(2)?,
            })
        },
    )?;

    let events = rows.collect::<Result<Vec<_>, _>>()?;
    log::debug!("Store: {} fire rows inside {bbox:?}", events.len());
    Ok(events)
}

/// Returns `(readings, fire_events)` row counts.
///
/// # Errors
///
/// Returns [`StoreError`] if the query fails.
pub fn table_counts(conn: &Connection) -> Result<(u64, u64), StoreError> {
    let readings: i64 = conn.query_row("SELECT COUNT(*) FROM air_quality", [], |row| row.get(0))?;
    let fires: i64 = conn.query_row("SELECT COUNT(*) FROM fire_events", [], |row| row.get(0))?;
    #[allow(clippy::cast_sign_loss)]
    Ok((readings as u64, fires as u64))
}
