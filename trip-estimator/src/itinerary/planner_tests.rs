//! Tests for the itinerary pipeline.

use super::*;
use crate::cost::{CostEstimator, CostError, FuelPriceFetcher};
use crate::domain::{BoundingBox, Coordinates, DomainError, TransportationMode};
use crate::places::{PlaceFetcher, PlaceResolver};
use crate::query::{PlaceQuery, resolve_query};
use crate::routing::{RouteFetcher, RouteRequest, RouteResolver};
use crate::traffic::{TrafficFetcher, TrafficResolver};
use crate::upstream::ProviderError;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const MORRINHOS: &str = include_str!("../../data/mock/places/morrinhos.json");
const CALDAS_NOVAS: &str = include_str!("../../data/mock/places/caldas_novas.json");
const ROUTE: &str = include_str!("../../data/mock/route.json");
const INCIDENTS: &str = include_str!("../../data/mock/incidents.json");
const FLOW: &str = include_str!("../../data/mock/flow.json");
const FUEL: &str = include_str!("../../data/mock/fuel/GO.html");

/// Search text whose lookup never completes.
const HANGS: &str = "Nowhere";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap()
}

fn find(text: &str) -> PlaceQuery {
    resolve_query(json!({"text_input": text, "input_type": "text"}).as_object().unwrap()).unwrap()
}

fn request() -> ItineraryRequest {
    ItineraryRequest::new(find("Morrinhos"), find("Caldas Novas"), TransportationMode::Car)
}

fn unavailable() -> ProviderError {
    ProviderError::Status {
        status: 503,
        message: "Service Unavailable".into(),
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Calls {
    places: usize,
    route: usize,
    incidents: usize,
    flow: usize,
    fuel: usize,
}

/// Mock provider for every stage, counting calls.
///
/// A `None` body makes that lookup fail as unavailable.
struct MockProvider {
    places: HashMap<String, Option<String>>,
    route: Option<String>,
    incidents: Option<String>,
    flow: Option<String>,
    fuel: Option<String>,
    calls: Mutex<Calls>,
}

impl MockProvider {
    fn new() -> Self {
        let mut places = HashMap::new();
        places.insert("Morrinhos".to_string(), Some(MORRINHOS.to_string()));
        places.insert("Caldas Novas".to_string(), Some(CALDAS_NOVAS.to_string()));
        Self {
            places,
            route: Some(ROUTE.to_string()),
            incidents: Some(INCIDENTS.to_string()),
            flow: Some(FLOW.to_string()),
            fuel: Some(FUEL.to_string()),
            calls: Mutex::new(Calls::default()),
        }
    }

    fn set_place(&mut self, text: &str, body: Option<&str>) {
        self.places.insert(text.to_string(), body.map(str::to_string));
    }

    fn calls(&self) -> Calls {
        *self.calls.lock().unwrap()
    }

    fn count(&self, f: impl FnOnce(&mut Calls)) {
        f(&mut self.calls.lock().unwrap());
    }
}

/// Shared handle so each resolver can own a fetcher.
#[derive(Clone)]
struct Mock(Arc<MockProvider>);

fn respond(body: &Option<String>) -> Result<String, ProviderError> {
    body.clone().ok_or_else(unavailable)
}

impl PlaceFetcher for Mock {
    async fn fetch_place(&self, query: &PlaceQuery) -> Result<String, ProviderError> {
        self.0.count(|c| c.places += 1);
        let text = query.search_text();
        if text == HANGS {
            std::future::pending::<()>().await;
        }
        match self.0.places.get(&text) {
            Some(body) => respond(body),
            None => Ok(r#"{"status": "ZERO_RESULTS", "results": []}"#.to_string()),
        }
    }

    fn photo_url(&self, reference: &str) -> String {
        format!("https://photos.test/{reference}")
    }
}

impl RouteFetcher for Mock {
    async fn fetch_route(&self, _request: &RouteRequest) -> Result<String, ProviderError> {
        self.0.count(|c| c.route += 1);
        respond(&self.0.route)
    }
}

impl TrafficFetcher for Mock {
    async fn fetch_incidents(&self, _bbox: &BoundingBox) -> Result<String, ProviderError> {
        self.0.count(|c| c.incidents += 1);
        respond(&self.0.incidents)
    }

    async fn fetch_flow(&self, _point: &Coordinates) -> Result<String, ProviderError> {
        self.0.count(|c| c.flow += 1);
        respond(&self.0.flow)
    }
}

impl FuelPriceFetcher for Mock {
    async fn fetch_fuel_price(&self, _state: &str) -> Result<String, ProviderError> {
        self.0.count(|c| c.fuel += 1);
        respond(&self.0.fuel)
    }

    fn source_url(&self, state: &str) -> String {
        format!("https://fuel.test/{state}")
    }
}

fn planner(provider: MockProvider) -> (ItineraryPlanner<Mock, Mock, Mock, Mock>, Arc<MockProvider>) {
    let provider = Arc::new(provider);
    let mock = Mock(provider.clone());
    let planner = ItineraryPlanner::new(
        PlaceResolver::new(mock.clone()),
        RouteResolver::new(mock.clone()),
        TrafficResolver::new(mock.clone()),
        CostEstimator::new(mock, "GO"),
    );
    (planner, provider)
}

#[tokio::test]
async fn assembles_itinerary() {
    let (planner, provider) = planner(MockProvider::new());

    let itinerary = planner.plan_at(&request(), now()).await.unwrap();

    assert_eq!(itinerary.start_point.name, "Morrinhos");
    assert_eq!(itinerary.end_point.name, "Caldas Novas");
    assert_eq!(itinerary.transportation_method, TransportationMode::Car);
    assert_eq!(itinerary.route.duration(), 51.0);
    assert_eq!(itinerary.departure_time, now());
    assert_eq!(itinerary.arrival_time, now() + Duration::minutes(51));

    // Light traffic: weight 1.0, fuel 6.19 per unit, 58.412 km, 51 min
    let cost = &itinerary.cost_estimate;
    assert_eq!(cost.cost_details.traffic_adjustment, 1.0);
    assert_eq!(cost.cost_details.fuel_price, 6.19);
    let expected = 5.0 + 58.412 / 10.0 * 6.19 + 51.0 / 60.0 * 0.5;
    assert!((cost.estimated_cost - expected).abs() < 1e-9);
    assert_eq!(cost.source_url, "https://fuel.test/GO");

    let calls = provider.calls();
    assert_eq!(calls.places, 2);
    assert_eq!(calls.route, 1);
    assert_eq!(calls.incidents, 1);
    assert!(calls.flow >= 1);
    assert_eq!(calls.fuel, 1);
}

#[tokio::test]
async fn depart_at_used_as_departure() {
    let (planner, _) = planner(MockProvider::new());
    let depart = now() + Duration::hours(2);

    let itinerary = planner
        .plan_at(&request().with_depart_at(depart), now())
        .await
        .unwrap();

    assert_eq!(itinerary.departure_time, depart);
    assert_eq!(itinerary.travel_time(), Duration::minutes(51));
}

#[tokio::test]
async fn end_place_failure_stops_pipeline() {
    let mut provider = MockProvider::new();
    provider.set_place("Caldas Novas", None);
    let (planner, provider) = planner(provider);

    let err = planner.plan_at(&request(), now()).await.unwrap_err();

    assert_eq!(err.stage, Stage::EndPlace);
    assert_eq!(err.stage.category(), "place resolution");
    assert!(err.is_upstream_unavailable());

    let calls = provider.calls();
    assert_eq!(calls.route, 0);
    assert_eq!(calls.incidents, 0);
    assert_eq!(calls.flow, 0);
    assert_eq!(calls.fuel, 0);
}

#[tokio::test]
async fn start_place_failure_names_start_stage() {
    let mut provider = MockProvider::new();
    provider.set_place("Morrinhos", Some(r#"{"status": "REQUEST_DENIED", "error_message": "bad key"}"#));
    let (planner, provider) = planner(provider);

    let err = planner.plan_at(&request(), now()).await.unwrap_err();

    assert_eq!(err.stage, Stage::StartPlace);
    assert_eq!(provider.calls().route, 0);
}

#[tokio::test]
async fn no_results_is_place_failure() {
    let (planner, _) = planner(MockProvider::new());
    let request = ItineraryRequest::new(find("Morrinhos"), find("Atlantis"), TransportationMode::Car);

    let err = planner.plan_at(&request, now()).await.unwrap_err();

    assert_eq!(err.stage, Stage::EndPlace);
    assert!(matches!(err.source, StageError::Provider(ProviderError::NoResults)));
}

#[tokio::test]
async fn place_failure_does_not_wait_for_sibling() {
    let mut provider = MockProvider::new();
    provider.set_place("Caldas Novas", None);
    let (planner, _) = planner(provider);
    let request = ItineraryRequest::new(find(HANGS), find("Caldas Novas"), TransportationMode::Car);

    let err = tokio::time::timeout(std::time::Duration::from_secs(5), planner.plan_at(&request, now()))
        .await
        .expect("planning should fail without waiting for the start place")
        .unwrap_err();

    assert_eq!(err.stage, Stage::EndPlace);
}

#[tokio::test]
async fn same_place_fails_route_stage() {
    let (planner, provider) = planner(MockProvider::new());
    let request = ItineraryRequest::new(find("Morrinhos"), find("Morrinhos"), TransportationMode::Car);

    let err = planner.plan_at(&request, now()).await.unwrap_err();

    assert_eq!(err.stage, Stage::Route);
    assert!(matches!(
        err.source,
        StageError::Validation(DomainError::SameEndpoints)
    ));
    assert_eq!(provider.calls().route, 0);
}

#[tokio::test]
async fn past_departure_fails_route_stage() {
    let (planner, provider) = planner(MockProvider::new());
    let request = request().with_depart_at(now() - Duration::minutes(5));

    let err = planner.plan_at(&request, now()).await.unwrap_err();

    assert_eq!(err.stage, Stage::Route);
    assert!(matches!(
        err.source,
        StageError::Validation(DomainError::TimeInPast("depart_at"))
    ));
    assert_eq!(provider.calls().places, 2);
    assert_eq!(provider.calls().route, 0);
}

#[tokio::test]
async fn route_failure_skips_traffic_and_cost() {
    let mut provider = MockProvider::new();
    provider.route = Some(r#"{"routes": []}"#.to_string());
    let (planner, provider) = planner(provider);

    let err = planner.plan_at(&request(), now()).await.unwrap_err();

    assert_eq!(err.stage, Stage::Route);
    assert_eq!(err.stage.category(), "route lookup");
    assert!(!err.is_upstream_unavailable());
    assert_eq!(provider.calls().incidents, 0);
    assert_eq!(provider.calls().fuel, 0);
}

#[tokio::test]
async fn traffic_failure_skips_cost() {
    let mut provider = MockProvider::new();
    provider.incidents = None;
    let (planner, provider) = planner(provider);

    let err = planner.plan_at(&request(), now()).await.unwrap_err();

    assert_eq!(err.stage, Stage::Traffic);
    assert_eq!(err.stage.category(), "traffic lookup");
    assert_eq!(provider.calls().fuel, 0);
}

#[tokio::test]
async fn cost_failure_names_cost_stage() {
    let mut provider = MockProvider::new();
    provider.fuel = Some("<p>no price here</p>".to_string());
    let (planner, _) = planner(provider);

    let err = planner.plan_at(&request(), now()).await.unwrap_err();

    assert_eq!(err.stage, Stage::Cost);
    assert_eq!(err.stage.category(), "cost estimation");
    assert!(matches!(
        err.source,
        StageError::Cost(CostError::FuelPrice(ProviderError::MissingField(_)))
    ));
}

#[tokio::test]
async fn heavy_traffic_raises_weight() {
    let mut provider = MockProvider::new();
    provider.flow = Some(FLOW.replace(r#""roadClosure": false"#, r#""roadClosure": true"#));
    let (planner, _) = planner(provider);

    let itinerary = planner.plan_at(&request(), now()).await.unwrap();

    assert_eq!(itinerary.cost_estimate.cost_details.traffic_adjustment, 1.5);
}

#[tokio::test]
async fn unrepresentable_arrival_fails_route_stage() {
    let mut provider = MockProvider::new();
    provider.route = Some(ROUTE.replace(r#""duration": "3060s""#, r#""duration": "10000000000000s""#));
    let (planner, provider) = planner(provider);

    let err = planner.plan_at(&request(), now()).await.unwrap_err();

    assert_eq!(err.stage, Stage::Route);
    assert!(matches!(
        err.source,
        StageError::Validation(DomainError::ArrivalOutOfRange { .. })
    ));
    assert_eq!(provider.calls().route, 1);
}
