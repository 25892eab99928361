//! Provider error types.

use crate::domain::{DomainError, MalformedPolyline};

/// Errors from fetching or interpreting a provider response.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid API key or unauthorized
    #[error("unauthorized (invalid API key)")]
    Unauthorized,

    /// Rate limited by the provider
    #[error("rate limited by provider")]
    RateLimited,

    /// Provider returned an error status code
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// Provider answered but refused the request in its payload
    #[error("provider refused request ({status}): {message}")]
    Refused { status: String, message: String },

    /// Payload could not be decoded
    #[error("malformed response: {message}")]
    Malformed {
        message: String,
        body: Option<String>,
    },

    /// A required field is absent from the payload
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Provider returned no matches
    #[error("no results")]
    NoResults,

    /// Parsed entity violates an invariant
    #[error("validation failed: {0}")]
    Validation(#[from] DomainError),

    /// Route polyline could not be decoded
    #[error("invalid polyline: {0}")]
    Polyline(#[from] MalformedPolyline),

    /// Provider cannot be reached with the current configuration
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// Every request in a batch failed
    #[error("all {attempts} requests failed, last: {last}")]
    Exhausted {
        attempts: usize,
        last: Box<ProviderError>,
    },
}

impl ProviderError {
    /// The provider could not be reached or refused to answer.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            ProviderError::Http(_)
                | ProviderError::Unauthorized
                | ProviderError::RateLimited
                | ProviderError::Status { .. }
                | ProviderError::Refused { .. }
                | ProviderError::NotConfigured(_)
                | ProviderError::Exhausted { .. }
        )
    }

    /// The provider answered with a payload that could not be used.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ProviderError::Malformed { .. }
                | ProviderError::MissingField(_)
                | ProviderError::Polyline(_)
        )
    }

    /// Malformed-response error keeping a prefix of the offending body.
    pub fn malformed(message: impl Into<String>, body: &str) -> Self {
        ProviderError::Malformed {
            message: message.into(),
            body: Some(body.chars().take(500).collect()),
        }
    }
}
