//! Compile-time registry of air-quality monitoring stations.
//!
//! Each entry is a `(network, toml_content)` pair embedded via
//! `include_str!`. Adding a network requires creating a TOML file in
//! `stations/` and adding a corresponding entry here.

use serde::Deserialize;
use wildfire_aq_geography_models::Station;

/// Number of registered stations. Enforced by a test.
#[cfg(test)]
const EXPECTED_STATION_COUNT: usize = 42;

/// Embedded TOML station lists.
const STATION_TOMLS: &[(&str, &str)] = &[("cetesb", include_str!("../stations/cetesb.toml"))];

#[derive(Deserialize)]
struct StationFile {
    stations: Vec<Station>,
}

/// Returns all registered stations, in file order.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse. Since these are
/// compile-time constants, parse failures indicate a development error
/// and are caught by the tests below.
#[must_use]
pub fn all_stations() -> Vec<Station> {
    STATION_TOMLS
        .iter()
        .flat_map(|(network, toml_str)| {
            toml::de::from_str::<StationFile>(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse station network '{network}': {e}"))
                .stations
        })
        .collect()
}

/// Looks up a station by its store key, ignoring case and surrounding
/// whitespace.
#[must_use]
pub fn find_station(id: &str) -> Option<Station> {
    let wanted = id.trim().to_lowercase();
    all_stations()
        .into_iter()
        .find(|station| station.id.to_lowercase() == wanted)
}
