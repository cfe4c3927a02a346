//! Terminal output and file exports for a finished analysis.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use wildfire_aq_analytics::export::{write_hotspots_geojson, write_joint_csv, write_lag_csv};
use wildfire_aq_geography_models::Station;
use wildfire_aq_pipeline::AnalysisReport;

/// Optional export destinations.
#[derive(Debug, Default)]
pub struct Exports {
    pub lags_csv: Option<PathBuf>,
    pub joint_csv: Option<PathBuf>,
    pub geojson: Option<PathBuf>,
}

fn create(path: &Path) -> std::io::Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        wildfire_aq_database::paths::ensure_dir(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

/// Prints the header, summary and lag table.
pub fn print_report(report: &AnalysisReport, station: &Station) {
    let request = &report.request;
    let summary = &report.summary;

    println!();
    println!(
        "{} | {} → {} | {} km radius around {}",
        station.name, request.start, request.end, request.radius_km, request.center
    );
    println!("{}", "-".repeat(72));
    println!("Fire detections in radius: {}", summary.fire_events);
    println!("Days with both series:     {}", summary.joint_days);
    println!("Mean PM2.5:                {:.2} µg/m³", summary.mean_pollutant);
    match summary.raw_correlation {
        Some(r) => println!("Same-day raw correlation:  {r:.3}"),
        None => println!("Same-day raw correlation:  undefined (constant series)"),
    }

    println!();
    if report.lags.is_empty() {
        println!("Not enough consecutive days to compute lagged correlations.");
    } else {
        println!("{:<6} {:>12}", "Lag", "Correlation");
        for entry in &report.lags {
            println!("{:<6} {:>12.4}", entry.lag, entry.correlation);
        }
        if let Some(best) = report.strongest_lag() {
            println!();
            println!(
                "Strongest correlation {:.3} at lag {} day(s)",
                best.correlation, best.lag
            );
        }
    }

    if !report.hotspots.is_empty() {
        println!();
        println!("Top fire locations:");
        for hotspot in report.hotspots.iter().take(5) {
            println!(
                "  ({:.4}, {:.4})  {} detections, {:.1} km away",
                hotspot.latitude, hotspot.longitude, hotspot.count, hotspot.mean_distance_km
            );
        }
    }
}

/// Writes every requested export.
///
/// # Errors
///
/// Returns an error if a file cannot be created or written.
pub fn write_exports(
    report: &AnalysisReport,
    exports: &Exports,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = &exports.lags_csv {
        write_lag_csv(create(path)?, &report.lags)?;
        log::info!("Wrote lag table to {}", path.display());
    }

    if let Some(path) = &exports.joint_csv {
        write_joint_csv(create(path)?, &report.joint)?;
        log::info!("Wrote joint series to {}", path.display());
    }

    if let Some(path) = &exports.geojson {
        write_hotspots_geojson(
            create(path)?,
            &report.request.station,
            report.request.center,
            report.summary.mean_pollutant,
            &report.hotspots,
        )?;
        log::info!("Wrote hotspots to {}", path.display());
    }

    Ok(())
}
