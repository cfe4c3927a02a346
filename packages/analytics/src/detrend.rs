//! Centred 3-day moving-average detrending.
//!
//! Raw pollutant levels and fire counts are both strongly autocorrelated,
//! which would make every lag look correlated. Subtracting the local mean
//! of days `d-1`, `d`, `d+1` leaves only the short-term fluctuation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use wildfire_aq_analytics_models::SeriesPoint;

/// `x - (prev + x + next) / 3`, arranged so that equal inputs give
/// exactly zero.
fn deviation(prev: f64, current: f64, next: f64) -> f64 {
    ((current - prev) + (current - next)) / 3.0
}

/// Detrends both columns of `series` independently.
///
/// Neighbours are the previous and next calendar days. A day is emitted
/// only when both neighbours are present in the input, so the first and
/// last day and every day next to a gap are dropped. Output is ascending
/// by date.
#[must_use]
pub fn detrend(series: &[SeriesPoint]) -> Vec<SeriesPoint> {
    let by_day: BTreeMap<NaiveDate, &SeriesPoint> =
        series.iter().map(|point| (point.date, point)).collect();

    let detrended: Vec<SeriesPoint> = by_day
        .values()
        .filter_map(|point| {
            let prev = by_day.get(&point.date.pred_opt()?)?;
            let next = by_day.get(&point.date.succ_opt()?)?;
            Some(SeriesPoint {
                date: point.date,
                pollutant: deviation(prev.pollutant, point.pollutant, next.pollutant),
                fire_count: deviation(prev.fire_count, point.fire_count, next.fire_count),
            })
        })
        .collect();

    log::debug!(
        "Detrended {} days into {} days",
        series.len(),
        detrended.len()
    );

    detrended
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(d: u32, pollutant: f64, fire_count: f64) -> SeriesPoint {
        SeriesPoint {
            date: NaiveDate::from_ymd_opt(2024, 7, d).unwrap(),
            pollutant,
            fire_count,
        }
    }

    #[test]
    fn constant_series_detrends_to_exact_zero() {
        let series: Vec<SeriesPoint> = (1..=10).map(|d| point(d, 0.1, 7.3)).collect();

        let detrended = detrend(&series);

        assert_eq!(detrended.len(), 8);
        for p in &detrended {
            assert!(p.pollutant == 0.0 && p.fire_count == 0.0, "{p:?}");
        }
    }

    #[test]
    fn drops_edges_and_gap_neighbours() {
        // Day 5 is missing: days 4 and 6 lose a neighbour.
        let series: Vec<SeriesPoint> = [1, 2, 3, 4, 6, 7, 8]
            .into_iter()
            .map(|d| point(d, f64::from(d), 1.0))
            .collect();

        let days: Vec<u32> = detrend(&series)
            .iter()
            .map(|p| chrono::Datelike::day(&p.date))
            .collect();

        assert_eq!(days, vec![2, 3, 7]);
    }

    #[test]
    fn linear_trend_is_removed() {
        let series: Vec<SeriesPoint> = (1..=6)
            .map(|d| point(d, 2.0 * f64::from(d), 5.0 - f64::from(d)))
            .collect();

        for p in detrend(&series) {
            assert!(p.pollutant.abs() < 1e-12);
            assert!(p.fire_count.abs() < 1e-12);
        }
    }

    #[test]
    fn spike_is_isolated() {
        let mut series: Vec<SeriesPoint> = (1..=5).map(|d| point(d, 10.0, 1.0)).collect();
        series[2].pollutant = 40.0;

        let detrended = detrend(&series);

        assert_eq!(detrended.len(), 3);
        assert!((detrended[0].pollutant - -10.0).abs() < 1e-12);
        assert!((detrended[1].pollutant - 20.0).abs() < 1e-12);
        assert!((detrended[2].pollutant - -10.0).abs() < 1e-12);
    }

    #[test]
    fn short_series_is_empty() {
        assert!(detrend(&[point(1, 1.0, 1.0), point(2, 2.0, 2.0)]).is_empty());
    }
}
