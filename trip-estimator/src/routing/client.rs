//! Route lookup HTTP client.

use std::future::Future;

use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::upstream::{HttpUpstream, ProviderError, UpstreamConfig};

use super::request::RouteRequest;

/// Default endpoint for route computation.
pub const DEFAULT_BASE_URL: &str = "https://routes.googleapis.com/directions/v2:computeRoutes";

/// Response fields requested from the provider.
const FIELD_MASK: &str = "routes.duration,routes.distanceMeters,routes.polyline.encodedPolyline,routes.legs,routes.travelAdvisory";

/// Default language for route instructions.
const DEFAULT_LANGUAGE: &str = "pt-BR";

/// Source of raw route lookup payloads.
pub trait RouteFetcher: Send + Sync {
    /// Compute a route for `request` and return the response body.
    fn fetch_route(
        &self,
        request: &RouteRequest,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;
}

/// Route lookup API client.
#[derive(Debug, Clone)]
pub struct RouteClient {
    upstream: HttpUpstream,
    language: String,
}

impl RouteClient {
    /// Config pointing at the production API.
    pub fn default_config(api_key: impl Into<String>) -> UpstreamConfig {
        UpstreamConfig::new(api_key, DEFAULT_BASE_URL)
    }

    /// Create a new client with the given configuration.
    pub fn new(config: UpstreamConfig) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();

        // The key travels in a header rather than the query string
        if !config.api_key.is_empty() {
            let api_key = HeaderValue::from_str(&config.api_key).map_err(|_| {
                ProviderError::NotConfigured("invalid API key format".to_string())
            })?;
            headers.insert("X-Goog-Api-Key", api_key);
        }
        headers.insert("X-Goog-FieldMask", HeaderValue::from_static(FIELD_MASK));

        Ok(Self {
            upstream: HttpUpstream::new(config, headers)?,
            language: DEFAULT_LANGUAGE.to_string(),
        })
    }

    /// Set the language for route instructions.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

impl RouteFetcher for RouteClient {
    async fn fetch_route(&self, request: &RouteRequest) -> Result<String, ProviderError> {
        self.upstream.require_key("route lookup")?;

        debug!(
            origin = request.origin(),
            destination = request.destination(),
            mode = %request.mode(),
            "fetching route"
        );
        let http_request = self
            .upstream
            .http()
            .post(self.upstream.base_url())
            .json(&request.payload(&self.language));
        self.upstream.send(http_request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unprintable_key() {
        let err = RouteClient::new(RouteClient::default_config("bad\nkey")).unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn language_override() {
        let client = RouteClient::new(RouteClient::default_config("k"))
            .unwrap()
            .with_language("en-US");
        assert_eq!(client.language, "en-US");
    }
}
