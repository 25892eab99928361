//! Traffic provider HTTP client.

use std::future::Future;

use reqwest::header::HeaderMap;
use tracing::debug;

use crate::domain::{BoundingBox, Coordinates};
use crate::upstream::{HttpUpstream, ProviderError, UpstreamConfig};

/// Default base URL for the traffic API.
pub const DEFAULT_BASE_URL: &str = "https://api.tomtom.com/traffic/services";

/// Incident fields requested from the provider.
const INCIDENT_FIELDS: &str =
    "{incidents{type,geometry{type,coordinates},properties{iconCategory}}}";

/// Language for incident descriptions.
const INCIDENT_LANGUAGE: &str = "pt-PT";

/// Incident categories included: present and planned.
const INCIDENT_CATEGORY_FILTER: &str = "1111";

/// Zoom level used for flow segment lookups.
const FLOW_ZOOM: u8 = 10;

/// Source of raw traffic payloads.
pub trait TrafficFetcher: Send + Sync {
    /// Incidents inside `bbox`.
    fn fetch_incidents(
        &self,
        bbox: &BoundingBox,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;

    /// Flow on the road segment nearest `point`.
    fn fetch_flow(
        &self,
        point: &Coordinates,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;
}

/// Traffic API client.
#[derive(Debug, Clone)]
pub struct TrafficClient {
    upstream: HttpUpstream,
}

impl TrafficClient {
    /// Config pointing at the production API.
    pub fn default_config(api_key: impl Into<String>) -> UpstreamConfig {
        UpstreamConfig::new(api_key, DEFAULT_BASE_URL)
    }

    /// Create a new client with the given configuration.
    pub fn new(config: UpstreamConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            upstream: HttpUpstream::new(config, HeaderMap::new())?,
        })
    }
}

impl TrafficFetcher for TrafficClient {
    async fn fetch_incidents(&self, bbox: &BoundingBox) -> Result<String, ProviderError> {
        let key = self.upstream.require_key("traffic lookup")?;
        let url = format!("{}/5/incidentDetails", self.upstream.base_url());

        debug!(%bbox, "fetching incidents");
        let request = self.upstream.http().get(&url).query(&[
            ("key", key.to_string()),
            ("bbox", bbox.to_string()),
            ("fields", INCIDENT_FIELDS.to_string()),
            ("language", INCIDENT_LANGUAGE.to_string()),
            ("t", INCIDENT_CATEGORY_FILTER.to_string()),
            ("timeValidityFilter", "present".to_string()),
        ]);
        self.upstream.send(request).await
    }

    async fn fetch_flow(&self, point: &Coordinates) -> Result<String, ProviderError> {
        let key = self.upstream.require_key("traffic lookup")?;
        let url = format!(
            "{}/4/flowSegmentData/absolute/{}/json",
            self.upstream.base_url(),
            FLOW_ZOOM
        );

        debug!(%point, "fetching flow");
        let request = self
            .upstream
            .http()
            .get(&url)
            .query(&[("key", key.to_string()), ("point", point.to_string())]);
        self.upstream.send(request).await
    }
}
