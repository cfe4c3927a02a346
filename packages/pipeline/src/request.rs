//! Analysis requests and their validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wildfire_aq_database_models::TimeWindow;
use wildfire_aq_geography::distance::validate_circle;
use wildfire_aq_geography::registry::find_station;
use wildfire_aq_geography_models::{GeoPoint, Station};

use crate::PipelineError;

/// One user-initiated analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Station key in the pollutant store.
    pub station: String,
    /// Centre of the fire search circle.
    pub center: GeoPoint,
    /// Search radius in kilometres.
    pub radius_km: f64,
    /// First day of the analysis.
    pub start: NaiveDate,
    /// Last day of the analysis, included through end of day.
    pub end: NaiveDate,
}

impl AnalysisRequest {
    /// Builds a request centred on a registered station.
    #[must_use]
    pub fn for_station(station: &Station, radius_km: f64, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            station: station.id.clone(),
            center: station.location(),
            radius_km,
            start,
            end,
        }
    }

    /// Checks the request before any store query and returns the
    /// registered station.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidParameters`] for a non-positive
    /// radius, a start date after the end date, a centre outside WGS84, or
    /// a station missing from the registry.
    pub fn validate(&self) -> Result<Station, PipelineError> {
        validate_circle(self.center, self.radius_km)?;

        if self.start > self.end {
            return Err(PipelineError::InvalidParameters {
                message: format!("start date {} is after end date {}", self.start, self.end),
            });
        }

        find_station(&self.station).ok_or_else(|| PipelineError::InvalidParameters {
            message: format!("unknown station '{}'", self.station),
        })
    }

    /// Returns the store query window: `start` 00:00 through the end of
    /// `end`.
    #[must_use]
    pub fn window(&self) -> TimeWindow {
        TimeWindow::for_days(self.start, self.end)
    }

    /// Returns the identifying parameters for error reports.
    #[must_use]
    pub fn context(&self) -> RequestContext {
        RequestContext {
            station: self.station.clone(),
            start: self.start,
            end: self.end,
            radius_km: self.radius_km,
        }
    }
}

/// The parameters a user needs to retry a failed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// Station key.
    pub station: String,
    /// First day.
    pub start: NaiveDate,
    /// Last day.
    pub end: NaiveDate,
    /// Search radius in kilometres.
    pub radius_km: f64,
}

impl std::fmt::Display for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "station '{}', {} to {}, radius {} km",
            self.station, self.start, self.end, self.radius_km
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn request() -> AnalysisRequest {
        let station = find_station("ibirapuera").unwrap();
        AnalysisRequest::for_station(&station, 150.0, day(7, 1), day(8, 30))
    }

    #[test]
    fn accepts_registered_station() {
        let station = request().validate().unwrap();
        assert_eq!(station.name, "Ibirapuera");
    }

    #[test]
    fn single_day_is_valid() {
        let mut req = request();
        req.end = req.start;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_bad_parameters() {
        let mut zero_radius = request();
        zero_radius.radius_km = 0.0;

        let mut reversed = request();
        reversed.start = day(9, 1);

        let mut unknown = request();
        unknown.station = "atlantis".to_string();

        let mut off_globe = request();
        off_globe.center = GeoPoint::new(95.0, 0.0);

        for req in [zero_radius, reversed, unknown, off_globe] {
            assert!(
                matches!(req.validate(), Err(PipelineError::InvalidParameters { .. })),
                "{req:?}"
            );
        }
    }

    #[test]
    fn context_names_station_dates_and_radius() {
        let text = request().context().to_string();
        assert_eq!(text, "station 'ibirapuera', 2024-07-01 to 2024-08-30, radius 150 km");
    }
}
