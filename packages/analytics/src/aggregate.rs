//! Daily fire counts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use wildfire_aq_analytics_models::{DailyFireCount, FilteredFireEvent};

/// Counts detections per calendar day, ascending by date.
///
/// Only days with at least one detection appear in the output.
#[must_use]
pub fn daily_fire_counts(events: &[FilteredFireEvent]) -> Vec<DailyFireCount> {
    let mut by_day: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for event in events {
        *by_day.entry(event.item.date).or_default() += 1;
    }

    log::debug!(
        "Aggregated {} fire detections into {} days",
        events.len(),
        by_day.len()
    );

    by_day
        .into_iter()
        .map(|(date, count)| DailyFireCount { date, count })
        .collect()
}
