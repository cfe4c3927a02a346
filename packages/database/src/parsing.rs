//! Date and timestamp parsing shared by the importers and the pipeline's
//! boundary coercion.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Parses a timestamp or a bare calendar day into a naive UTC timestamp.
///
/// Accepts, in order:
/// - `2024-07-15T10:30:00Z` / `2024-07-15T10:30:00-03:00` (RFC 3339,
///   converted to UTC)
/// - `2024-07-15 10:30:00` and `2024-07-15T10:30:00`, each with optional
///   fractional seconds
/// - `2024-07-15` (midnight)
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.naive_utc());
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Parses a timestamp or calendar day and returns its calendar day.
#[must_use]
pub fn parse_day(s: &str) -> Option<NaiveDate> {
    parse_timestamp(s).map(|ts| ts.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_bare_day() {
        assert_eq!(parse_day("2024-07-15"), Some(day(2024, 7, 15)));
    }

    #[test]
    fn parses_space_separated_timestamp() {
        let ts = parse_timestamp("2024-07-15 10:30:00").unwrap();
        assert_eq!(ts.to_string(), "2024-07-15 10:30:00");
    }

    #[test]
    fn parses_fractional_seconds() {
        let ts = parse_timestamp("2024-07-15T10:30:00.250").unwrap();
        assert_eq!(ts.to_string(), "2024-07-15 10:30:00.250");
    }

    #[test]
    fn converts_offsets_to_utc() {
        let ts = parse_timestamp("2024-07-15T22:30:00-03:00").unwrap();
        assert_eq!(ts.date(), day(2024, 7, 16));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("not-a-date").is_none());
        assert!(parse_timestamp("").is_none());
        assert!(parse_day("2024-13-40").is_none());
    }
}
