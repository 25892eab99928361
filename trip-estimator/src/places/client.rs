//! Place lookup HTTP client.

use std::future::Future;

use reqwest::Url;
use reqwest::header::HeaderMap;
use tracing::{debug, warn};

use crate::query::PlaceQuery;
use crate::upstream::{HttpUpstream, ProviderError, UpstreamConfig};

/// Default base URL for the place lookup API.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Maximum photo width requested in picture URLs.
const PHOTO_MAX_WIDTH: u32 = 400;

/// Source of raw place lookup payloads.
///
/// This abstraction allows the resolver to be tested with canned data.
pub trait PlaceFetcher: Send + Sync {
    /// Run `query` against the provider and return the response body.
    fn fetch_place(
        &self,
        query: &PlaceQuery,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;

    /// URL at which the photo with `reference` can be downloaded.
    fn photo_url(&self, reference: &str) -> String;
}

/// Place lookup API client.
#[derive(Debug, Clone)]
pub struct PlaceClient {
    upstream: HttpUpstream,
}

impl PlaceClient {
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

impl PlaceFetcher for PlaceClient {
    async fn fetch_place(&self, query: &PlaceQuery) -> Result<String, ProviderError> {
        let key = self.upstream.require_key("place lookup")?;
        let url = format!(
            "{}/{}/json",
            self.upstream.base_url(),
            query.kind().endpoint()
        );

        let mut params = query.to_params();
        params.push(("key", key.to_string()));

        debug!(endpoint = %query.kind(), search = %query.search_text(), "fetching place");
        let request = self.upstream.http().get(&url).query(&params);
        self.upstream.send(request).await
    }

    fn photo_url(&self, reference: &str) -> String {
        let base = format!("{}/photo", self.upstream.base_url());
        let max_width = PHOTO_MAX_WIDTH.to_string();
        let params = [
            ("maxwidth", max_width.as_str()),
            ("photoreference", reference),
            ("key", self.upstream.api_key()),
        ];
        match Url::parse_with_params(&base, &params) {
            Ok(url) => url.into(),
            Err(e) => {
                warn!(%base, error = %e, "invalid place base URL");
                let query: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
                format!("{base}?{}", query.join("&"))
            }
        }
    }
}
