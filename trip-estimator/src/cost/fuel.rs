//! Fuel price source.
//!
//! Prices are scraped from a public HTML page, one per state. The page
//! holds the final price in a single element, formatted with a comma
//! decimal separator.

use std::future::Future;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::HeaderMap;
use tracing::debug;

use crate::upstream::{HttpUpstream, ProviderError, UpstreamConfig};

/// Default page prefix; the state code is appended.
pub const DEFAULT_BASE_URL: &str =
    "https://precos.petrobras.com.br/web/precos-dos-combustiveis/w/gasolina/";

/// Default state code.
pub const DEFAULT_STATE: &str = "GO";

/// Opening tag of the element holding the final price.
static PRICE_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<([a-z0-9]+)[^>]*\bid\s*=\s*["']telafinal-precofinal["'][^>]*>"#)
        .expect("valid fuel price pattern")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

/// Source of raw fuel price documents.
pub trait FuelPriceFetcher: Send + Sync {
    /// Price document for `state`.
    fn fetch_fuel_price(
        &self,
        state: &str,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;

    /// Where the price for `state` comes from.
    fn source_url(&self, state: &str) -> String;
}

/// Fuel price page client. No API key is needed.
#[derive(Debug, Clone)]
pub struct FuelPriceClient {
    upstream: HttpUpstream,
}

impl FuelPriceClient {
    /// Config pointing at the production page.
    pub fn default_config() -> UpstreamConfig {
        UpstreamConfig::new("", DEFAULT_BASE_URL)
    }

    /// Create a new client with the given configuration.
    pub fn new(config: UpstreamConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            upstream: HttpUpstream::new(config, HeaderMap::new())?,
        })
    }
}

impl FuelPriceFetcher for FuelPriceClient {
    async fn fetch_fuel_price(&self, state: &str) -> Result<String, ProviderError> {
        let url = self.source_url(state);
        debug!(%url, "fetching fuel price");
        self.upstream.send(self.upstream.http().get(&url)).await
    }

    fn source_url(&self, state: &str) -> String {
        format!("{}/{}", self.upstream.base_url(), state)
    }
}

/// Extract the fuel price from a price page.
///
/// Accepts `5,67`, `R$ 5,67` and `1.234,56`.
///
/// # Errors
///
/// [`ProviderError::MissingField`] if the price element is absent,
/// [`ProviderError::Malformed`] if its text is not a positive number.
pub fn parse_fuel_price(html: &str) -> Result<f64, ProviderError> {
    let inner = price_element_content(html)
        .ok_or(ProviderError::MissingField("telafinal-precofinal"))?;
    let text = TAG.replace_all(inner, "");
    let raw = text.trim();

    let normalized: String = raw
        .trim_start_matches("R$")
        .trim()
        .chars()
        .filter(|c| *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    normalized
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price > 0.0)
        .ok_or_else(|| ProviderError::malformed(format!("invalid fuel price {raw:?}"), html))
}

/// Everything between the price element's opening tag and its own
/// closing tag, inner markup included.
fn price_element_content(html: &str) -> Option<&str> {
    let captures = PRICE_ELEMENT.captures(html)?;
    let close = format!("</{}", captures.get(1)?.as_str().to_ascii_lowercase());
    let rest = &html[captures.get(0)?.end()..];
    // ASCII lowercasing keeps byte offsets
    let lower = rest.to_ascii_lowercase();
    let end = lower
        .match_indices(&close)
        .map(|(i, _)| i)
        .find(|&i| !lower[i + close.len()..].starts_with(|c: char| c.is_ascii_alphanumeric()))?;
    Some(&rest[..end])
}
