//! Pearson correlation and the lag table.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use wildfire_aq_analytics_models::{LagCorrelation, SeriesPoint};

/// Default largest lag, in days.
pub const DEFAULT_MAX_LAG: u32 = 5;

/// Largest lag a caller may ask for, in days.
pub const MAX_LAG_LIMIT: u32 = 365;

/// Fewest paired observations for which a lag is reported.
pub const MIN_PAIRS: usize = 3;

fn mean(values: &[f64]) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    values.iter().sum::<f64>() / n
}

/// Relative spread below which a sample counts as constant. Detrending a
/// linear ramp leaves rounding residue around 1e-16, not true variance.
const CONSTANT_TOLERANCE: f64 = 1e-9;

fn is_constant(values: &[f64]) -> bool {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let scale = min.abs().max(max.abs()).max(1.0);
    max - min <= CONSTANT_TOLERANCE * scale
}

/// Pearson correlation coefficient of two equal-length samples.
///
/// Returns `None` when the lengths differ, fewer than two values are
/// given, or either sample is constant (spread within rounding noise of
/// its magnitude). The result is clamped to
/// `[-1, 1]`.
#[must_use]
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 || is_constant(xs) || is_constant(ys) {
        return None;
    }

    let mean_x = mean(xs);
    let mean_y = mean(ys);

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Correlates fire counts with pollutant values `lag` days later, for
/// every lag in `0..=max_lag`.
///
/// For lag `ℓ`, the fire count of day `t` is paired with the pollutant
/// value of day `t + ℓ`; days without a partner are skipped. Lags with
/// fewer than [`MIN_PAIRS`] pairs or an undefined coefficient are left
/// out. Output is ascending by lag.
#[must_use]
pub fn lagged_correlations(series: &[SeriesPoint], max_lag: u32) -> Vec<LagCorrelation> {
    let pollutant_by_day: BTreeMap<NaiveDate, f64> = series
        .iter()
        .filter(|p| p.pollutant.is_finite())
        .map(|p| (p.date, p.pollutant))
        .collect();

    let mut fires: Vec<&SeriesPoint> = series
        .iter()
        .filter(|p| p.fire_count.is_finite())
        .collect();
    fires.sort_by_key(|p| p.date);

    let mut table = Vec::new();
    for lag in 0..=max_lag {
        let shift = Days::new(u64::from(lag));
        let (xs, ys): (Vec<f64>, Vec<f64>) = fires
            .iter()
            .filter_map(|p| {
                let target = p.date.checked_add_days(shift)?;
                pollutant_by_day.get(&target).map(|&y| (p.fire_count, y))
            })
            .unzip();

        if xs.len() < MIN_PAIRS {
            log::debug!("Lag {lag}: {} pairs, skipped", xs.len());
            continue;
        }

        match pearson(&xs, &ys) {
            Some(correlation) => table.push(LagCorrelation { lag, correlation }),
            None => log::debug!("Lag {lag}: zero variance, skipped"),
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng as _, SeedableRng as _};

    use super::*;
    use crate::detrend::detrend;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
    }

    fn series(fires: &[f64], pollutant: &[f64]) -> Vec<SeriesPoint> {
        fires
            .iter()
            .zip(pollutant)
            .enumerate()
            .map(|(i, (&fire_count, &pollutant))| SeriesPoint {
                date: start() + Days::new(i as u64),
                pollutant,
                fire_count,
            })
            .collect()
    }

    #[test]
    fn pearson_of_linear_relation_is_one() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [3.0, 5.0, 7.0, 9.0];
        assert!((pearson(&xs, &ys).unwrap() - 1.0).abs() < 1e-12);

        let neg = [9.0, 7.0, 5.0, 3.0];
        assert!((pearson(&xs, &neg).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_undefined_for_constant_or_mismatched() {
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), None);
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[0.1, 0.1, 0.1]), None);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0]), None);
        assert_eq!(pearson(&[1.0], &[1.0]), None);
    }

    #[test]
    fn lag_pairs_fire_day_with_later_pollutant() {
        // Pollutant repeats the fire counts two days later.
        let fires = [1.0, 5.0, 2.0, 8.0, 3.0, 7.0, 4.0, 6.0];
        let pollutant = [0.0, 0.0, 1.0, 5.0, 2.0, 8.0, 3.0, 7.0];

        let table = lagged_correlations(&series(&fires, &pollutant), 4);

        let at_two = table.iter().find(|e| e.lag == 2).unwrap();
        assert!((at_two.correlation - 1.0).abs() < 1e-12);
        assert!(table.iter().all(|e| e.correlation <= at_two.correlation));
        assert!(table.windows(2).all(|w| w[0].lag < w[1].lag));
    }

    #[test]
    fn omits_lags_with_fewer_than_three_pairs() {
        let fires = [1.0, 3.0, 2.0, 5.0];
        let pollutant = [2.0, 1.0, 4.0, 3.0];

        let lags: Vec<u32> = lagged_correlations(&series(&fires, &pollutant), 5)
            .iter()
            .map(|e| e.lag)
            .collect();

        // 4 days: lag 0 has 4 pairs, lag 1 has 3, lag 2 has 2.
        assert_eq!(lags, vec![0, 1]);
    }

    #[test]
    fn omits_lags_with_zero_variance() {
        let fires = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let pollutant = [9.0, 4.0, 4.0, 4.0, 4.0, 4.0];

        let lags: Vec<u32> = lagged_correlations(&series(&fires, &pollutant), 3)
            .iter()
            .map(|e| e.lag)
            .collect();

        // From lag 1 on, every paired pollutant value is 4.
        assert_eq!(lags, vec![0]);
    }

    #[test]
    fn detrended_linear_ramp_has_no_lags() {
        let fires = [3.0, 0.0, 7.0, 1.0, 4.0, 9.0, 2.0, 6.0, 0.0, 5.0, 8.0, 1.0];
        let pollutant: Vec<f64> = (0..12).map(|i| 0.1f64.mul_add(f64::from(i), 10.0)).collect();

        let detrended = detrend(&series(&fires, &pollutant));
        assert!(detrended.iter().all(|p| p.pollutant.abs() < 1e-12));

        let table = lagged_correlations(&detrended, 5);
        assert!(table.is_empty(), "{table:?}");
    }

    #[test]
    fn rounding_noise_counts_as_constant() {
        let noise = [0.0, -5.92e-16, 5.92e-16, 0.0, 1.1e-16];
        assert_eq!(pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &noise), None);
        assert!(pearson(&[1.0, 2.0, 3.0], &[1e-3, 2e-3, 4e-3]).is_some());
    }

    #[test]
    fn gaps_are_not_bridged() {
        let mut points = series(&[1.0, 2.0, 3.0, 4.0], &[2.0, 1.0, 4.0, 3.0]);
        points[3].date = start() + Days::new(10);

        let lags: Vec<u32> = lagged_correlations(&points, 1)
            .iter()
            .map(|e| e.lag)
            .collect();

        // Calendar lag 1 only pairs days 0-1 and 1-2.
        assert_eq!(lags, vec![0]);
    }

    #[test]
    fn shifted_copy_peaks_at_its_shift() {
        let mut rng = StdRng::seed_from_u64(42);

        for k in 0..=5u32 {
            let n = 60;
            let xs: Vec<f64> = (0..n).map(|_| rng.random_range(0.0..50.0)).collect();
            let ys: Vec<f64> = (0..n)
                .map(|t| {
                    if t >= k as usize {
                        xs[t - k as usize]
                    } else {
                        rng.random_range(0.0..50.0)
                    }
                })
                .collect();

            let detrended = detrend(&series(&xs, &ys));
            let table = lagged_correlations(&detrended, 5);

            let best = table
                .iter()
                .max_by(|a, b| a.correlation.total_cmp(&b.correlation))
                .unwrap();
            assert_eq!(best.lag, k, "table: {table:?}");
            assert!((best.correlation - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn correlations_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let xs: Vec<f64> = (0..40).map(|_| rng.random_range(-5.0..5.0)).collect();
        let ys: Vec<f64> = (0..40).map(|_| rng.random_range(-5.0..5.0)).collect();

        for entry in lagged_correlations(&series(&xs, &ys), 5) {
            assert!((-1.0..=1.0).contains(&entry.correlation));
        }
    }
}
