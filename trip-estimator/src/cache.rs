//! Caching layer for fuel price documents.
//!
//! Fuel prices change at most daily, while every itinerary needs one. The
//! raw price page is cached per state code so repeated estimates skip the
//! scrape.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::cost::FuelPriceFetcher;
use crate::upstream::ProviderError;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(6 * 60 * 60),
            max_capacity: 64,
        }
    }
}

/// Fuel price fetcher with caching.
///
/// Wraps any `FuelPriceFetcher` and caches its documents by state code.
/// Failures are not cached.
pub struct CachedFuelPrices<F> {
    fetcher: F,
    documents: MokaCache<String, Arc<str>>,
}

impl<F: FuelPriceFetcher> CachedFuelPrices<F> {
    /// Create a new cached fetcher.
    pub fn new(fetcher: F, config: &CacheConfig) -> Self {
        let documents = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { fetcher, documents }
    }

    /// Access the underlying fetcher for operations that bypass cache.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.documents.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.documents.invalidate_all();
    }
}

impl<F: FuelPriceFetcher> FuelPriceFetcher for CachedFuelPrices<F> {
    async fn fetch_fuel_price(&self, state: &str) -> Result<String, ProviderError> {
        let key = state.to_ascii_uppercase();

        // Try cache first
        if let Some(cached) = self.documents.get(&key).await {
            debug!(state = %key, "fuel price cache hit");
            return Ok(cached.to_string());
        }

        let body = self.fetcher.fetch_fuel_price(state).await?;
        self.documents.insert(key, Arc::from(body.as_str())).await;

        Ok(body)
    }

    fn source_url(&self, state: &str) -> String {
        self.fetcher.source_url(state)
    }
}
