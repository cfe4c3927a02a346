//! Boundary coercion from loosely typed store rows to analysis records.
//!
//! Rows that cannot be used are dropped and counted, never raised as
//! errors.

use wildfire_aq_analytics_models::{FireEvent, PollutantReading};
use wildfire_aq_database::parsing::parse_day;
use wildfire_aq_database_models::{RawFireEvent, RawReading, RawValue};
use wildfire_aq_geography_models::GeoPoint;

fn coerce_value(value: &RawValue) -> Option<f64> {
    let v = match value {
        RawValue::Number(n) => *n,
        RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
    };
    (v.is_finite() && v >= 0.0).then_some(v)
}

/// Keeps readings with a parsable date and a finite, non-negative value.
#[must_use]
pub fn coerce_readings(rows: &[RawReading]) -> Vec<PollutantReading> {
    let readings: Vec<PollutantReading> = rows
        .iter()
        .filter_map(|row| {
            let date = parse_day(row.date.as_deref()?)?;
            let value = coerce_value(row.value.as_ref()?)?;
            Some(PollutantReading { date, value })
        })
        .collect();

    let dropped = rows.len() - readings.len();
    if dropped > 0 {
        log::info!("Dropped {dropped} of {} pollutant rows during cleaning", rows.len());
    }

    readings
}

/// Keeps fire detections with a parsable date and valid WGS84
/// coordinates.
#[must_use]
pub fn coerce_fire_events(rows: &[RawFireEvent]) -> Vec<FireEvent> {
    let events: Vec<FireEvent> = rows
        .iter()
        .filter_map(|row| {
            let date = parse_day(row.date.as_deref()?)?;
            let point = GeoPoint::new(row.latitude?, row.longitude?);
            point.is_valid().then_some(FireEvent {
                date,
                latitude: point.latitude,
                longitude: point.longitude,
            })
        })
        .collect();

    let dropped = rows.len() - events.len();
    if dropped > 0 {
        log::info!("Dropped {dropped} of {} fire rows during cleaning", rows.len());
    }

    events
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn reading(date: Option<&str>, value: Option<RawValue>) -> RawReading {
        RawReading {
            date: date.map(str::to_string),
            value,
        }
    }

    #[test]
    fn drops_unusable_readings() {
        let rows = vec![
            reading(Some("2024-07-01"), Some(RawValue::Number(12.0))),
            reading(Some("2024-07-02 13:00:00"), Some(RawValue::Text(" 8.5 ".into()))),
            reading(Some("2024-07-03"), Some(RawValue::Text("n/a".into()))),
            reading(Some("2024-07-04"), Some(RawValue::Text("NaN".into()))),
            reading(Some("2024-07-05"), Some(RawValue::Number(-1.0))),
            reading(Some("2024-07-06"), Some(RawValue::Number(f64::INFINITY))),
            reading(Some("garbage"), Some(RawValue::Number(3.0))),
            reading(None, Some(RawValue::Number(3.0))),
            reading(Some("2024-07-09"), None),
        ];

        let readings = coerce_readings(&rows);

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1].date, NaiveDate::from_ymd_opt(2024, 7, 2).unwrap());
        assert!((readings[1].value - 8.5).abs() < 1e-12);
    }

    #[test]
    fn zero_is_a_valid_reading() {
        let rows = vec![reading(Some("2024-07-01"), Some(RawValue::Number(0.0)))];
        assert_eq!(coerce_readings(&rows).len(), 1);
    }

    #[test]
    fn drops_unusable_fire_rows() {
        let rows = vec![
            RawFireEvent {
                date: Some("2024-07-01".into()),
                latitude: Some(-23.0),
                longitude: Some(-46.0),
            },
            RawFireEvent {
                date: Some("2024-07-01".into()),
                latitude: None,
                longitude: Some(-46.0),
            },
            RawFireEvent {
                date: Some("2024-07-01".into()),
                latitude: Some(-123.0),
                longitude: Some(-46.0),
            },
            RawFireEvent {
                date: Some("2024-07-01".into()),
                latitude: Some(f64::NAN),
                longitude: Some(-46.0),
            },
            RawFireEvent {
                date: None,
                latitude: Some(-23.0),
                longitude: Some(-46.0),
            },
        ];

        let events = coerce_fire_events(&rows);

        assert_eq!(events.len(), 1);
        assert!((events[0].latitude - -23.0).abs() < 1e-12);
    }
}
