//! Shared plumbing for provider HTTP clients.
//!
//! Every provider client is built from an [`UpstreamConfig`] and wraps an
//! [`HttpUpstream`], which owns the `reqwest` client, bounds concurrent
//! requests with a semaphore, and turns HTTP status codes into
//! [`ProviderError`] variants.

mod error;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use tokio::sync::{Semaphore, SemaphorePermit};

pub use error::ProviderError;

/// Default maximum concurrent requests per provider.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for one provider client.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// API key for authentication (may be empty for keyless providers)
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    /// Create a config with the given API key and default base URL.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP access to one provider.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    semaphore: Arc<Semaphore>,
}

impl HttpUpstream {
    /// Build the client, installing `headers` on every request.
    pub fn new(config: UpstreamConfig, headers: HeaderMap) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Fail early when the provider needs a key and none was configured.
    pub fn require_key(&self, provider: &str) -> Result<&str, ProviderError> {
        if self.api_key.is_empty() {
            Err(ProviderError::NotConfigured(format!(
                "no API key for {provider}"
            )))
        } else {
            Ok(&self.api_key)
        }
    }

    async fn permit(&self) -> Result<SemaphorePermit<'_>, ProviderError> {
        self.semaphore
            .acquire()
            .await
            .map_err(|_| ProviderError::Status {
                status: 0,
                message: "Semaphore closed".to_string(),
            })
    }

    /// Send a request under the concurrency limit and return the body text.
    pub async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ProviderError> {
        let _permit = self.permit().await?;
        let response = request.send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Deserialize a provider body, keeping a prefix of it on failure.
pub fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::malformed(e.to_string(), body))
}

/// Deserialize a field that the provider may send as `null`, treating
/// `null` like an absent field.
///
/// Use together with `#[serde(default)]`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
