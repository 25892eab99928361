//! Service configuration from environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use crate::upstream::UpstreamConfig;
use crate::{cost, places, routing, traffic};

/// Default port for the HTTP server.
pub const DEFAULT_PORT: u16 = 50051;

/// Default provider request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error reading configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the server needs to build its providers.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Key for the place and route lookups
    pub google_api_key: String,
    /// Key for the traffic lookup
    pub tomtom_api_key: String,
    pub places_base_url: String,
    pub routes_base_url: String,
    pub traffic_base_url: String,
    pub fuel_base_url: String,
    /// State whose fuel price is used for estimates
    pub fuel_state: String,
    pub port: u16,
    pub timeout_secs: u64,
    /// Fixture directory; when set, providers are replaced by fixtures
    pub mock_data: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            google_api_key: String::new(),
            tomtom_api_key: String::new(),
            places_base_url: places::DEFAULT_BASE_URL.to_string(),
            routes_base_url: routing::DEFAULT_BASE_URL.to_string(),
            traffic_base_url: traffic::DEFAULT_BASE_URL.to_string(),
            fuel_base_url: cost::DEFAULT_BASE_URL.to_string(),
            fuel_state: cost::DEFAULT_STATE.to_string(),
            port: DEFAULT_PORT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            mock_data: None,
        }
    }
}

impl ServiceConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the configuration through `lookup`. Blank values count as unset.
    ///
    /// Missing API keys are logged, not fatal: the server can still run
    /// against fixtures.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let mock_data = get("TRIP_MOCK_DATA").map(PathBuf::from);
        let google_api_key = get("GOOGLE_MAPS_API_KEY").unwrap_or_default();
        let tomtom_api_key = get("TOMTOM_API_KEY").unwrap_or_default();
        if mock_data.is_none() {
            if google_api_key.is_empty() {
                warn!("GOOGLE_MAPS_API_KEY not set; place and route lookups will fail");
            }
            if tomtom_api_key.is_empty() {
                warn!("TOMTOM_API_KEY not set; traffic lookups will fail");
            }
        }

        Ok(Self {
            google_api_key,
            tomtom_api_key,
            places_base_url: get("PLACES_BASE_URL").unwrap_or(defaults.places_base_url),
            routes_base_url: get("ROUTES_BASE_URL").unwrap_or(defaults.routes_base_url),
            traffic_base_url: get("TRAFFIC_BASE_URL").unwrap_or(defaults.traffic_base_url),
            fuel_base_url: get("FUEL_BASE_URL").unwrap_or(defaults.fuel_base_url),
            fuel_state: get("FUEL_STATE")
                .map(|s| s.to_ascii_uppercase())
                .unwrap_or(defaults.fuel_state),
            port: parse_var("SERVER_PORT", get("SERVER_PORT"))?.unwrap_or(defaults.port),
            timeout_secs: match parse_var("UPSTREAM_TIMEOUT_SECS", get("UPSTREAM_TIMEOUT_SECS"))? {
                Some(0) => {
                    return Err(ConfigError::InvalidValue {
                        var: "UPSTREAM_TIMEOUT_SECS",
                        value: "0".to_string(),
                        reason: "must be positive".to_string(),
                    });
                }
                Some(secs) => secs,
                None => defaults.timeout_secs,
            },
            mock_data,
        })
    }

    pub fn places_upstream(&self) -> UpstreamConfig {
        UpstreamConfig::new(&self.google_api_key, &self.places_base_url).with_timeout(self.timeout_secs)
    }

    pub fn routes_upstream(&self) -> UpstreamConfig {
        UpstreamConfig::new(&self.google_api_key, &self.routes_base_url).with_timeout(self.timeout_secs)
    }

    pub fn traffic_upstream(&self) -> UpstreamConfig {
        UpstreamConfig::new(&self.tomtom_api_key, &self.traffic_base_url).with_timeout(self.timeout_secs)
    }

    pub fn fuel_upstream(&self) -> UpstreamConfig {
        UpstreamConfig::new("", &self.fuel_base_url).with_timeout(self.timeout_secs)
    }
}

fn parse_var<T>(var: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                var,
                reason: e.to_string(),
                value: v,
            })
        })
        .transpose()
}
