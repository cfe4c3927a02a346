//! Runtime settings for a pipeline run.

use std::time::Duration;

use wildfire_aq_analytics::correlation::{DEFAULT_MAX_LAG, MAX_LAG_LIMIT};

/// Environment variable overriding the largest lag.
pub const MAX_LAG_ENV: &str = "WILDFIRE_AQ_MAX_LAG";

/// Environment variable overriding the store timeout, in whole seconds.
pub const STORE_TIMEOUT_ENV: &str = "WILDFIRE_AQ_STORE_TIMEOUT_SECS";

/// Default bound on a single store query.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings shared by every request a [`crate::Pipeline`] serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Largest lag (in days) in the correlation table.
    pub max_lag: u32,
    /// Bound on each store query; exceeding it fails the run.
    pub store_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_lag: DEFAULT_MAX_LAG,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

impl PipelineConfig {
    /// Reads [`MAX_LAG_ENV`] and [`STORE_TIMEOUT_ENV`], keeping the
    /// defaults for unset, unparsable or out-of-range values.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(MAX_LAG_ENV) {
            match raw.trim().parse::<u32>() {
                Ok(max_lag) if max_lag <= MAX_LAG_LIMIT => config.max_lag = max_lag,
                Ok(_) => log::warn!("Ignoring {MAX_LAG_ENV}={raw:?}: must be at most {MAX_LAG_LIMIT}"),
                Err(e) => log::warn!("Ignoring {MAX_LAG_ENV}={raw:?}: {e}"),
            }
        }

        if let Some(raw) = lookup(STORE_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.store_timeout = Duration::from_secs(secs),
                Ok(_) => log::warn!("Ignoring {STORE_TIMEOUT_ENV}={raw:?}: must be positive"),
                Err(e) => log::warn!("Ignoring {STORE_TIMEOUT_ENV}={raw:?}: {e}"),
            }
        }

        config
    }

    /// Returns a copy with a different largest lag.
    #[must_use]
    pub const fn with_max_lag(mut self, max_lag: u32) -> Self {
        self.max_lag = max_lag;
        self
    }

    /// Returns a copy with a different store timeout.
    #[must_use]
    pub const fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }
}
