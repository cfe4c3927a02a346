//! Locations with the most fire detections.

use std::collections::HashMap;

use wildfire_aq_analytics_models::{FilteredFireEvent, Hotspot};

/// Number of hotspots kept in a report.
pub const HOTSPOT_LIMIT: usize = 100;

/// Groups detections by exact coordinates and returns the `limit` busiest
/// locations.
///
/// Sorted by count descending, then latitude and longitude ascending.
#[must_use]
pub fn top_hotspots(events: &[FilteredFireEvent], limit: usize) -> Vec<Hotspot> {
    let mut groups: HashMap<(u64, u64), (f64, f64, u32, f64)> = HashMap::new();
    for event in events {
        let (lat, lon) = (event.item.latitude, event.item.longitude);
        let entry = groups
            .entry((lat.to_bits(), lon.to_bits()))
            .or_insert((lat, lon, 0, 0.0));
        entry.2 += 1;
        entry.3 += event.distance_km;
    }

    let mut hotspots: Vec<Hotspot> = groups
        .into_values()
        .map(|(latitude, longitude, count, distance_sum)| Hotspot {
            latitude,
            longitude,
            count,
            mean_distance_km: distance_sum / f64::from(count),
        })
        .collect();

    hotspots.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then(a.latitude.total_cmp(&b.latitude))
            .then(a.longitude.total_cmp(&b.longitude))
    });
    hotspots.truncate(limit);
    hotspots
}
