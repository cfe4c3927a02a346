//! Interactive form for a single analysis.
//!
//! Prompts for station, date range and radius with `dialoguer`, then hands
//! back a request for the same run/print/export flow as `wildfire_aq run`.

use std::path::PathBuf;

use chrono::NaiveDate;
use dialoguer::{Confirm, Input, Select};
use wildfire_aq_geography::registry::all_stations;
use wildfire_aq_pipeline::AnalysisRequest;

use crate::report::Exports;

const DEFAULT_STATION: &str = "ibirapuera";
const DEFAULT_START: &str = "2024-07-01";
const DEFAULT_END: &str = "2024-08-30";
const DEFAULT_RADIUS_KM: f64 = 150.0;
const MIN_RADIUS_KM: f64 = 10.0;
const MAX_RADIUS_KM: f64 = 1000.0;

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn prompt_date(prompt: &str, default: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    let raw: String = Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .validate_with(|s: &String| parse_date(s).map(|_| ()))
        .interact_text()?;
    Ok(parse_date(&raw)?)
}

fn prompt_export(prompt: &str, default: &str) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
    if !Confirm::new().with_prompt(prompt).default(false).interact()? {
        return Ok(None);
    }
    let path: String = Input::new()
        .with_prompt("  File")
        .default(default.to_string())
        .interact_text()?;
    Ok(Some(PathBuf::from(path)))
}

/// Runs the form and returns the request plus chosen exports.
///
/// # Errors
///
/// Returns an error if a prompt fails (e.g. no terminal).
pub fn prompt() -> Result<(AnalysisRequest, Exports), Box<dyn std::error::Error>> {
    let stations = all_stations();
    let labels: Vec<String> = stations
        .iter()
        .map(|s| format!("{} ({})", s.name, s.id))
        .collect();
    let default_idx = stations
        .iter()
        .position(|s| s.id == DEFAULT_STATION)
        .unwrap_or(0);

    let idx = Select::new()
        .with_prompt("Monitoring station")
        .items(&labels)
        .default(default_idx)
        .interact()?;
    let station = &stations[idx];

    let start = prompt_date("Start date", DEFAULT_START)?;
    let end = loop {
        let end = prompt_date("End date", DEFAULT_END)?;
        if end >= start {
            break end;
        }
        println!("End date must not be before {start}.");
    };

    let radius_km: f64 = Input::new()
        .with_prompt(format!("Radius in km ({MIN_RADIUS_KM}-{MAX_RADIUS_KM})"))
        .default(DEFAULT_RADIUS_KM)
        .validate_with(|r: &f64| {
            if (MIN_RADIUS_KM..=MAX_RADIUS_KM).contains(r) {
                Ok(())
            } else {
                Err(format!("must be between {MIN_RADIUS_KM} and {MAX_RADIUS_KM}"))
            }
        })
        .interact_text()?;

    let exports = Exports {
        lags_csv: prompt_export("Export lag table as CSV?", "lag_correlations.csv")?,
        joint_csv: prompt_export("Export joint daily series as CSV?", "joint_series.csv")?,
        geojson: prompt_export("Export fire hotspots as GeoJSON?", "hotspots.geojson")?,
    };

    Ok((
        AnalysisRequest::for_station(station, radius_km, start, end),
        exports,
    ))
}
