//! Daily pollutant means and the inner join with fire counts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use wildfire_aq_analytics_models::{DailyFireCount, JointRow, PollutantReading};

/// Collapses readings to one mean value per calendar day, ascending by
/// date.
#[must_use]
pub fn daily_means(readings: &[PollutantReading]) -> Vec<PollutantReading> {
    let mut by_day: BTreeMap<NaiveDate, (f64, u32)> = BTreeMap::new();
    for reading in readings {
        let (sum, n) = by_day.entry(reading.date).or_insert((0.0, 0));
        *sum += reading.value;
        *n += 1;
    }

    by_day
        .into_iter()
        .map(|(date, (sum, n))| PollutantReading {
            date,
            value: sum / f64::from(n),
        })
        .collect()
}

/// Inner-joins pollutant readings and fire counts on calendar day.
///
/// Days present in only one input are dropped; nothing is filled in. The
/// output has unique dates in ascending order.
#[must_use]
pub fn join_series(readings: &[PollutantReading], counts: &[DailyFireCount]) -> Vec<JointRow> {
    let counts_by_day: BTreeMap<NaiveDate, u32> =
        counts.iter().map(|c| (c.date, c.count)).collect();

    let means = daily_means(readings);
    let reading_days = means.len();

    let joint: Vec<JointRow> = means
        .into_iter()
        .filter_map(|reading| {
            counts_by_day.get(&reading.date).map(|&fire_count| JointRow {
                date: reading.date,
                pollutant: reading.value,
                fire_count,
            })
        })
        .collect();

    log::debug!(
        "Joined {reading_days} reading days ({} readings) with {} fire days into {} joint days",
        readings.len(),
        counts.len(),
        joint.len()
    );

    joint
}
