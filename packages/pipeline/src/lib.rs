#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Orchestrates one fire / PM2.5 correlation run.
//!
//! [`Pipeline::run`] validates the request, fetches pollutant readings and
//! fire detections from the injected [`AirQualityStore`] (each query bounded
//! by [`PipelineConfig::store_timeout`]), cleans them at the boundary, and
//! then runs radius filter → daily counts → join → summary → detrend →
//! lag table. Every run is independent; nothing is cached between calls.

pub mod coerce;
pub mod config;
pub mod request;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use wildfire_aq_analytics::aggregate::daily_fire_counts;
use wildfire_aq_analytics::correlation::{MAX_LAG_LIMIT, lagged_correlations, pearson};
use wildfire_aq_analytics::detrend::detrend;
use wildfire_aq_analytics::hotspots::{HOTSPOT_LIMIT, top_hotspots};
use wildfire_aq_analytics::join::join_series;
use wildfire_aq_analytics_models::{
    FilteredFireEvent, Hotspot, JointRow, LagCorrelation, RawSummary, SeriesPoint,
};
use wildfire_aq_database::{AirQualityStore, StoreError};
use wildfire_aq_geography::GeoError;
use wildfire_aq_geography::distance::bounding_box;
use wildfire_aq_geography::filter::within_radius;

pub use config::PipelineConfig;
pub use request::{AnalysisRequest, RequestContext};

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request was rejected before any store query.
    #[error("Invalid parameters: {message}")]
    InvalidParameters {
        /// Description of what went wrong.
        message: String,
    },

    /// The store could not be reached or failed the query.
    #[error("Data store unavailable ({context}): {source}")]
    StoreUnavailable {
        /// The request that failed.
        context: RequestContext,
        /// Underlying store failure.
        source: StoreError,
    },

    /// A store query exceeded the configured bound.
    #[error("Data store query timed out after {}s ({context})", .timeout.as_secs_f64())]
    StoreTimeout {
        /// The request that failed.
        context: RequestContext,
        /// The bound that was exceeded.
        timeout: Duration,
    },

    /// The queries succeeded but left nothing to analyse.
    #[error("No data available ({context}): {reason}")]
    DataUnavailable {
        /// The request that produced no data.
        context: RequestContext,
        /// Which series came back empty.
        reason: String,
    },
}

impl From<GeoError> for PipelineError {
    fn from(e: GeoError) -> Self {
        Self::InvalidParameters {
            message: e.to_string(),
        }
    }
}

/// Everything a presentation layer needs from one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// The request that produced this report.
    pub request: AnalysisRequest,
    /// Raw daily pollutant means joined with daily fire counts.
    pub joint: Vec<JointRow>,
    /// Correlation per lag on the detrended series, ascending by lag. May
    /// be empty when the series is too short.
    pub lags: Vec<LagCorrelation>,
    /// Raw-series summary statistics.
    pub summary: RawSummary,
    /// Fire detections inside the radius, for heat maps.
    pub fire_events: Vec<FilteredFireEvent>,
    /// Busiest detection locations.
    pub hotspots: Vec<Hotspot>,
}

impl AnalysisReport {
    /// Returns the entry with the highest correlation, if any.
    #[must_use]
    pub fn strongest_lag(&self) -> Option<&LagCorrelation> {
        self.lags
            .iter()
            .max_by(|a, b| a.correlation.total_cmp(&b.correlation))
    }
}

/// Runs analyses against a store.
#[derive(Clone)]
pub struct Pipeline {
    store: Arc<dyn AirQualityStore>,
    config: PipelineConfig,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a pipeline over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn AirQualityStore>, config: PipelineConfig) -> Self {
        Self { store, config }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    async fn bounded<T, F>(&self, context: &RequestContext, query: F) -> Result<T, PipelineError>
    where
        F: Future<Output = Result<T, StoreError>> + Send,
    {
        let timeout = self.config.store_timeout;
        match tokio::time::timeout(timeout, query).await {
            Ok(Ok(rows)) => Ok(rows),
            Ok(Err(source)) => Err(PipelineError::StoreUnavailable {
                context: context.clone(),
                source,
            }),
            Err(_) => Err(PipelineError::StoreTimeout {
                context: context.clone(),
                timeout,
            }),
        }
    }

    /// Runs one analysis.
    ///
    /// # Errors
    ///
    /// * [`PipelineError::InvalidParameters`] if the request fails
    ///   validation or the configured max lag is above [`MAX_LAG_LIMIT`]
    ///   (no store query is made).
    /// * [`PipelineError::StoreUnavailable`] / [`PipelineError::StoreTimeout`]
    ///   if a store query fails or exceeds the timeout.
    /// * [`PipelineError::DataUnavailable`] if either series has no usable
    ///   rows or the two share no dates.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisReport, PipelineError> {
        let station = request.validate()?;
        if self.config.max_lag > MAX_LAG_LIMIT {
            return Err(PipelineError::InvalidParameters {
                message: format!(
                    "max lag {} exceeds the limit of {MAX_LAG_LIMIT} days",
                    self.config.max_lag
                ),
            });
        }
        let context = request.context();
        let window = request.window();
        let bbox = bounding_box(request.center, request.radius_km)?;

        log::info!("Running analysis for {context}");

        let raw_readings = self
            .bounded(
                &context,
                self.store.fetch_pollutant_series(&station.id, window),
            )
            .await?;
        let readings = coerce::coerce_readings(&raw_readings);
        log::info!("{} usable pollutant readings", readings.len());

        let raw_fires = self
            .bounded(&context, self.store.fetch_fire_events(bbox, window))
            .await?;
        let fires = coerce::coerce_fire_events(&raw_fires);
        let fire_events = within_radius(request.center, request.radius_km, fires)?;
        log::info!(
            "{} of {} fire detections within {} km",
            fire_events.len(),
            raw_fires.len(),
            request.radius_km
        );

        if readings.is_empty() {
            return Err(PipelineError::DataUnavailable {
                context,
                reason: "no usable pollutant readings".to_string(),
            });
        }
        if fire_events.is_empty() {
            return Err(PipelineError::DataUnavailable {
                context,
                reason: "no fire detections within the radius".to_string(),
            });
        }

        let counts = daily_fire_counts(&fire_events);
        let joint = join_series(&readings, &counts);
        log::info!("{} fire days, {} joint days", counts.len(), joint.len());
        if joint.is_empty() {
            return Err(PipelineError::DataUnavailable {
                context,
                reason: "pollutant readings and fire detections share no dates".to_string(),
            });
        }

        let summary = summarize(&joint, fire_events.len());

        let points: Vec<SeriesPoint> = joint.iter().map(JointRow::to_point).collect();
        let detrended = detrend(&points);
        let lags = lagged_correlations(&detrended, self.config.max_lag);
        log::info!(
            "{} detrended days, {} of {} lags computed",
            detrended.len(),
            lags.len(),
            self.config.max_lag.saturating_add(1)
        );

        let hotspots = top_hotspots(&fire_events, HOTSPOT_LIMIT);

        Ok(AnalysisReport {
            request: request.clone(),
            joint,
            lags,
            summary,
            fire_events,
            hotspots,
        })
    }
}

fn summarize(joint: &[JointRow], fire_events: usize) -> RawSummary {
    let pollutant: Vec<f64> = joint.iter().map(|row| row.pollutant).collect();
    let fire_counts: Vec<f64> = joint.iter().map(|row| f64::from(row.fire_count)).collect();

    #[allow(clippy::cast_precision_loss)]
    let mean_pollutant = pollutant.iter().sum::<f64>() / joint.len() as f64;

    RawSummary {
        mean_pollutant,
        raw_correlation: pearson(&fire_counts, &pollutant),
        joint_days: joint.len(),
        fire_events,
    }
}
