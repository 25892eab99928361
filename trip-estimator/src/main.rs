use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use trip_estimator::cache::{CacheConfig, CachedFuelPrices};
use trip_estimator::config::ServiceConfig;
use trip_estimator::cost::{CostEstimator, FuelPriceClient};
use trip_estimator::itinerary::ItineraryPlanner;
use trip_estimator::mock::FixtureFetcher;
use trip_estimator::places::{PlaceClient, PlaceResolver};
use trip_estimator::routing::{RouteClient, RouteResolver};
use trip_estimator::traffic::{TrafficClient, TrafficResolver};
use trip_estimator::web::{AppState, create_router};

type LivePlanner =
    ItineraryPlanner<PlaceClient, RouteClient, TrafficClient, CachedFuelPrices<FuelPriceClient>>;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServiceConfig::from_env().expect("Invalid configuration");

    // Fixtures replace every provider when configured
    let app = match &config.mock_data {
        Some(dir) => {
            let fetcher = FixtureFetcher::new(dir).expect("Failed to load fixture data");
            info!(dir = %dir.display(), places = ?fetcher.available_places(), "using fixture data");
            create_router(AppState::new(fetcher.planner(&config.fuel_state)))
        }
        None => create_router(AppState::new(live_planner(&config))),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, fuel_state = %config.fuel_state, "Trip estimator listening");
    info!("  GET  /health  - Health check");
    info!("  POST /travel  - Estimate a trip");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}

fn live_planner(config: &ServiceConfig) -> LivePlanner {
    let places = PlaceClient::new(config.places_upstream()).expect("Failed to create place client");
    let routes = RouteClient::new(config.routes_upstream()).expect("Failed to create route client");
    let traffic =
        TrafficClient::new(config.traffic_upstream()).expect("Failed to create traffic client");
    let fuel =
        FuelPriceClient::new(config.fuel_upstream()).expect("Failed to create fuel price client");

    ItineraryPlanner::new(
        PlaceResolver::new(places),
        RouteResolver::new(routes),
        TrafficResolver::new(traffic),
        CostEstimator::new(
            CachedFuelPrices::new(fuel, &CacheConfig::default()),
            &config.fuel_state,
        ),
    )
}
