#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Correlates wildfire detections with PM2.5 near a monitoring station.
//!
//! ```text
//! wildfire_aq run --station ibirapuera --radius-km 150 --start 2024-07-01 --end 2024-08-30
//! wildfire_aq stations
//! wildfire_aq import-fires fires.csv
//! wildfire_aq import-readings readings.csv
//! ```
//!
//! Running `wildfire_aq` with no subcommand opens an interactive form.
//!
//! Uses `indicatif-log-bridge` (via [`wildfire_aq_cli_utils::init_logger`])
//! so that log lines and the query spinner never fight for the terminal.

mod interactive;
mod report;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use wildfire_aq_analytics::correlation::MAX_LAG_LIMIT;
use wildfire_aq_cli_utils::MultiProgress;
use wildfire_aq_database::import::{import_fire_events_csv, import_readings_csv};
use wildfire_aq_database::paths::store_path_from_env;
use wildfire_aq_database::store_db::{self, DuckDbStore};
use wildfire_aq_geography::registry::{all_stations, find_station};
use wildfire_aq_geography_models::GeoPoint;
use wildfire_aq_pipeline::{AnalysisRequest, Pipeline, PipelineConfig, PipelineError};

use crate::report::{Exports, print_report, write_exports};

#[derive(Parser)]
#[command(
    name = "wildfire_aq",
    about = "Correlate wildfire detections with PM2.5 near an air-quality station"
)]
struct Cli {
    /// `DuckDB` store (defaults to $WILDFIRE_AQ_DB or data/air_quality.duckdb)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Store query timeout in seconds (defaults to $WILDFIRE_AQ_STORE_TIMEOUT_SECS or 5)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one analysis and print the lag table
    Run(RunArgs),
    /// List the registered monitoring stations
    Stations,
    /// Load fire detections from a `date,latitude,longitude` CSV
    ImportFires {
        /// CSV file to load
        path: PathBuf,
    },
    /// Load pollutant readings from a `station,date,pm25` CSV
    ImportReadings {
        /// CSV file to load
        path: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Station key (see `wildfire_aq stations`)
    #[arg(long)]
    station: String,

    /// Centre latitude (defaults to the station's)
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Centre longitude (defaults to the station's)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Fire search radius in kilometres
    #[arg(long, default_value = "150")]
    radius_km: f64,

    /// First day (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,

    /// Last day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    end: NaiveDate,

    /// Largest lag in days, at most 365 (defaults to $WILDFIRE_AQ_MAX_LAG or 5)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_LAG_LIMIT)))]
    max_lag: Option<u32>,

    /// Write the lag table (`Lag,Correlation`) to this CSV file
    #[arg(long)]
    lags_csv: Option<PathBuf>,

    /// Write the joint daily series to this CSV file
    #[arg(long)]
    joint_csv: Option<PathBuf>,

    /// Write fire hotspots to this `GeoJSON` file
    #[arg(long)]
    geojson: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = wildfire_aq_cli_utils::init_logger();
    let cli = Cli::parse();

    let db_path = cli.db.unwrap_or_else(store_path_from_env);
    let mut config = PipelineConfig::from_env();
    if let Some(secs) = cli.timeout_secs {
        config = config.with_store_timeout(Duration::from_secs(secs.max(1)));
    }

    let Some(command) = cli.command else {
        println!("Wildfire / Air Quality Correlation");
        println!();
        let (request, exports) = interactive::prompt()?;
        return analyse(&multi, db_path, config, &request, &exports).await;
    };

    match command {
        Commands::Run(args) => {
            let station = find_station(&args.station).ok_or_else(|| {
                format!(
                    "unknown station '{}' (run `wildfire_aq stations` to list them)",
                    args.station
                )
            })?;

            let mut request =
                AnalysisRequest::for_station(&station, args.radius_km, args.start, args.end);
            if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
                request.center = GeoPoint::new(lat, lon);
            }
            if let Some(max_lag) = args.max_lag {
                config = config.with_max_lag(max_lag);
            }

            let exports = Exports {
                lags_csv: args.lags_csv,
                joint_csv: args.joint_csv,
                geojson: args.geojson,
            };
            analyse(&multi, db_path, config, &request, &exports).await?;
        }
        Commands::Stations => {
            println!("{:<32} {:<32} {:>10} {:>10}", "ID", "NAME", "LAT", "LON");
            println!("{}", "-".repeat(87));
            for station in all_stations() {
                println!(
                    "{:<32} {:<32} {:>10.4} {:>10.4}",
                    station.id, station.name, station.latitude, station.longitude
                );
            }
        }
        Commands::ImportFires { path } => {
            let conn = store_db::open(&db_path)?;
            let stats = import_fire_events_csv(&conn, &path)?;
            let (readings, fires) = store_db::table_counts(&conn)?;
            println!(
                "Imported {} fire detections ({} rows skipped). Store now holds {fires} detections and {readings} readings.",
                stats.imported, stats.skipped
            );
        }
        Commands::ImportReadings { path } => {
            let conn = store_db::open(&db_path)?;
            let stats = import_readings_csv(&conn, &path)?;
            let (readings, fires) = store_db::table_counts(&conn)?;
            println!(
                "Imported {} pollutant readings ({} rows skipped). Store now holds {readings} readings and {fires} detections.",
                stats.imported, stats.skipped
            );
        }
    }

    Ok(())
}

/// Runs the pipeline against the `DuckDB` store, prints the report and
/// writes exports. An empty result is reported, not treated as a failure.
async fn analyse(
    multi: &MultiProgress,
    db_path: PathBuf,
    config: PipelineConfig,
    request: &AnalysisRequest,
    exports: &Exports,
) -> Result<(), Box<dyn std::error::Error>> {
    let station = request.validate()?;
    let pipeline = Pipeline::new(Arc::new(DuckDbStore::new(db_path)), config);

    let spinner = wildfire_aq_cli_utils::spinner(
        multi,
        &format!("Analysing {} ({} km)", station.name, request.radius_km),
    );
    let result = pipeline.run(request).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            print_report(&report, &station);
            write_exports(&report, exports)?;
            Ok(())
        }
        Err(PipelineError::DataUnavailable { context, reason }) => {
            println!("No data found for {context}: {reason}.");
            println!("Try a wider radius or a different date range.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
