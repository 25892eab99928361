//! Fixture-backed fetchers for running without provider access.
//!
//! Loads canned provider payloads from a directory and serves them as if
//! they were live responses. Expected layout:
//!
//! ```text
//! places/{key}.json    place lookups, keyed by `fixture_key(search text)`
//! route.json           route lookup (same for every request)
//! incidents.json       traffic incidents
//! flow.json            traffic flow (same for every point)
//! fuel/{STATE}.html    fuel price pages
//! ```
//!
//! A `places/default.json` answers queries with no matching file.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::cost::{CostEstimator, FuelPriceFetcher};
use crate::domain::{BoundingBox, Coordinates};
use crate::itinerary::ItineraryPlanner;
use crate::places::{PlaceFetcher, PlaceResolver};
use crate::query::PlaceQuery;
use crate::routing::{RouteFetcher, RouteRequest, RouteResolver};
use crate::traffic::{TrafficFetcher, TrafficResolver};
use crate::upstream::ProviderError;

/// Planner whose every stage is served from fixtures.
pub type FixturePlanner =
    ItineraryPlanner<FixtureFetcher, FixtureFetcher, FixtureFetcher, FixtureFetcher>;

/// Place fixture used when no file matches the query.
const DEFAULT_PLACE: &str = "default";

/// File name for a search text: lowercase, runs of other characters
/// collapsed to `_`.
///
/// ```
/// use trip_estimator::mock::fixture_key;
///
/// assert_eq!(fixture_key("Caldas Novas"), "caldas_novas");
/// assert_eq!(fixture_key("  Rio -- Verde! "), "rio_verde");
/// ```
pub fn fixture_key(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

#[derive(Debug)]
struct Fixtures {
    places: HashMap<String, String>,
    route: String,
    incidents: String,
    flow: String,
    fuel: HashMap<String, String>,
}

/// Fetcher that serves data from fixture files.
///
/// Implements every fetcher trait, so one instance can back the whole
/// pipeline.
#[derive(Debug, Clone)]
pub struct FixtureFetcher {
    fixtures: Arc<Fixtures>,
}

impl FixtureFetcher {
    /// Load all fixtures from `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let data_dir = data_dir.as_ref();

        let places = read_all(&data_dir.join("places"), "json", str::to_string)?;
        if places.is_empty() {
            return Err(ProviderError::NotConfigured(format!(
                "no place fixtures found in {:?}",
                data_dir.join("places")
            )));
        }

        let fixtures = Fixtures {
            places,
            route: read(&data_dir.join("route.json"))?,
            incidents: read(&data_dir.join("incidents.json"))?,
            flow: read(&data_dir.join("flow.json"))?,
            fuel: read_all(&data_dir.join("fuel"), "html", str::to_ascii_uppercase)?,
        };

        debug!(
            places = fixtures.places.len(),
            fuel_states = fixtures.fuel.len(),
            "loaded fixtures"
        );
        Ok(Self {
            fixtures: Arc::new(fixtures),
        })
    }

    /// A planner using these fixtures for every stage, pricing fuel in
    /// `fuel_state`.
    pub fn planner(self, fuel_state: impl Into<String>) -> FixturePlanner {
        ItineraryPlanner::new(
            PlaceResolver::new(self.clone()),
            RouteResolver::new(self.clone()),
            TrafficResolver::new(self.clone()),
            CostEstimator::new(self, fuel_state),
        )
    }

    /// Place fixture keys available.
    pub fn available_places(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.fixtures.places.keys().cloned().collect();
        keys.sort();
        keys
    }
}

fn read(path: &Path) -> Result<String, ProviderError> {
    std::fs::read_to_string(path)
        .map_err(|e| ProviderError::NotConfigured(format!("failed to read {path:?}: {e}")))
}

/// Every `*.{extension}` file in `dir`, keyed by `key(file stem)`.
///
/// A missing directory yields an empty map.
fn read_all(
    dir: &Path,
    extension: &str,
    key: impl Fn(&str) -> String,
) -> Result<HashMap<String, String>, ProviderError> {
    let mut files = HashMap::new();
    if !dir.is_dir() {
        return Ok(files);
    }

    let entries = std::fs::read_dir(dir)
        .map_err(|e| ProviderError::NotConfigured(format!("failed to read {dir:?}: {e}")))?;

    for entry in entries {
        let path = entry
            .map_err(|e| ProviderError::NotConfigured(format!("failed to read entry: {e}")))?
            .path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some(extension) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        files.insert(key(stem), read(&path)?);
    }
    Ok(files)
}

impl PlaceFetcher for FixtureFetcher {
    async fn fetch_place(&self, query: &PlaceQuery) -> Result<String, ProviderError> {
        let key = fixture_key(&query.search_text());
        let places = &self.fixtures.places;

        places
            .get(&key)
            .or_else(|| places.get(DEFAULT_PLACE))
            .cloned()
            .ok_or_else(|| ProviderError::Status {
                status: 404,
                message: format!(
                    "No mock data for place {key}. Available: {:?}",
                    self.available_places()
                ),
            })
    }

    fn photo_url(&self, reference: &str) -> String {
        format!("mock://photo/{reference}")
    }
}

impl RouteFetcher for FixtureFetcher {
    async fn fetch_route(&self, _request: &RouteRequest) -> Result<String, ProviderError> {
        Ok(self.fixtures.route.clone())
    }
}

impl TrafficFetcher for FixtureFetcher {
    async fn fetch_incidents(&self, _bbox: &BoundingBox) -> Result<String, ProviderError> {
        Ok(self.fixtures.incidents.clone())
    }

    async fn fetch_flow(&self, _point: &Coordinates) -> Result<String, ProviderError> {
        Ok(self.fixtures.flow.clone())
    }
}

impl FuelPriceFetcher for FixtureFetcher {
    async fn fetch_fuel_price(&self, state: &str) -> Result<String, ProviderError> {
        let state = state.to_ascii_uppercase();
        self.fixtures
            .fuel
            .get(&state)
            .cloned()
            .ok_or_else(|| ProviderError::Status {
                status: 404,
                message: format!("No mock fuel price for state {state}"),
            })
    }

    fn source_url(&self, state: &str) -> String {
        format!("mock://fuel/{}", state.to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransportationMode;
    use crate::query::resolve_query;
    use chrono::Utc;
    use serde_json::json;

    fn query(value: serde_json::Value) -> PlaceQuery {
        resolve_query(value.as_object().unwrap()).unwrap()
    }

    fn write_fixtures(dir: &Path) {
        std::fs::create_dir_all(dir.join("places")).unwrap();
        std::fs::create_dir_all(dir.join("fuel")).unwrap();
        std::fs::write(dir.join("places/morrinhos.json"), r#"{"status":"OK"}"#).unwrap();
        std::fs::write(dir.join("places/notes.txt"), "ignored").unwrap();
        std::fs::write(dir.join("route.json"), r#"{"routes":[]}"#).unwrap();
        std::fs::write(dir.join("incidents.json"), r#"{"incidents":[]}"#).unwrap();
        std::fs::write(dir.join("flow.json"), "{}").unwrap();
        std::fs::write(dir.join("fuel/go.html"), "<p>6,19</p>").unwrap();
    }

    #[test]
    fn keys() {
        assert_eq!(fixture_key("Morrinhos"), "morrinhos");
        assert_eq!(fixture_key("São Paulo"), "são_paulo");
        assert_eq!(fixture_key(""), "");
    }

    #[tokio::test]
    async fn serves_fixtures_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_fixtures(dir.path());
        let fetcher = FixtureFetcher::new(dir.path()).unwrap();

        assert_eq!(fetcher.available_places(), vec!["morrinhos"]);

        let body = fetcher
            .fetch_place(&query(json!({"text_input": "Morrinhos", "input_type": "text"})))
            .await
            .unwrap();
        assert_eq!(body, r#"{"status":"OK"}"#);

        assert_eq!(fetcher.fetch_fuel_price("go").await.unwrap(), "<p>6,19</p>");
        assert_eq!(fetcher.source_url("go"), "mock://fuel/GO");
    }

    #[tokio::test]
    async fn unknown_place_without_default_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_fixtures(dir.path());
        let fetcher = FixtureFetcher::new(dir.path()).unwrap();

        let err = fetcher
            .fetch_place(&query(json!({"query": "Goiânia", "radius": 100})))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("morrinhos"));
    }

    #[tokio::test]
    async fn default_place_used_as_fallback() {
        let dir = tempfile::tempdir().unwrap();
        write_fixtures(dir.path());
        std::fs::write(dir.path().join("places/default.json"), "{}").unwrap();
        let fetcher = FixtureFetcher::new(dir.path()).unwrap();

        let body = fetcher
            .fetch_place(&query(json!({"query": "Goiânia", "radius": 100})))
            .await
            .unwrap();
        assert_eq!(body, "{}");
    }

    #[test]
    fn missing_files_not_configured() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            FixtureFetcher::new(dir.path()),
            Err(ProviderError::NotConfigured(_))
        ));

        write_fixtures(dir.path());
        std::fs::remove_file(dir.path().join("route.json")).unwrap();
        assert!(matches!(
            FixtureFetcher::new(dir.path()),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn bundled_fixtures_parse() {
        let fetcher = FixtureFetcher::new("data/mock").unwrap();

        let start = crate::places::PlaceResolver::new(fetcher.clone())
            .resolve(&query(json!({"text_input": "Morrinhos", "inputtype": "textquery"})))
            .await
            .unwrap();
        assert_eq!(start.name, "Morrinhos");

        let request = RouteRequest::new(
            "a",
            "b",
            TransportationMode::Car,
            None,
            None,
            Utc::now(),
        )
        .unwrap();
        let route = crate::routing::RouteResolver::new(fetcher.clone())
            .resolve(&request)
            .await
            .unwrap();
        assert_eq!(route.duration(), 51.0);

        let traffic = crate::traffic::TrafficResolver::new(fetcher.clone())
            .resolve(route.polyline(), TransportationMode::Car)
            .await
            .unwrap();
        assert_eq!(traffic.incidents.len(), 1);

        let price =
            crate::cost::parse_fuel_price(&fetcher.fetch_fuel_price("GO").await.unwrap()).unwrap();
        assert_eq!(price, 6.19);
    }
}
