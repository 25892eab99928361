//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::cost::FuelPriceFetcher;
use crate::domain::{TourItinerary, TransportationMode};
use crate::itinerary::{ItineraryError, ItineraryRequest};
use crate::places::PlaceFetcher;
use crate::query::{QueryError, resolve_query};
use crate::routing::RouteFetcher;
use crate::traffic::TrafficFetcher;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<P, R, T, F>(state: AppState<P, R, T, F>) -> Router
where
    P: PlaceFetcher + 'static,
    R: RouteFetcher + 'static,
    T: TrafficFetcher + 'static,
    F: FuelPriceFetcher + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/travel", post(plan_travel::<P, R, T, F>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Estimate a trip between two places.
async fn plan_travel<P, R, T, F>(
    State(state): State<AppState<P, R, T, F>>,
    payload: Result<Json<TravelRequest>, JsonRejection>,
) -> Result<Json<TourItinerary>, AppError>
where
    P: PlaceFetcher,
    R: RouteFetcher,
    T: TrafficFetcher,
    F: FuelPriceFetcher,
{
    let Json(req) = payload.map_err(|e| AppError::BadRequest {
        message: e.body_text(),
    })?;
    let request = itinerary_request(req)?;

    let itinerary = state.planner.plan(&request).await?;
    Ok(Json(itinerary))
}

/// Resolve the untyped request into a typed pipeline request.
fn itinerary_request(req: TravelRequest) -> Result<ItineraryRequest, AppError> {
    let place_a = resolve_query(&req.place_a).map_err(|e| AppError::query("place_a", e))?;
    let place_b = resolve_query(&req.place_b).map_err(|e| AppError::query("place_b", e))?;
    let transportation = req
        .transportation_method
        .parse::<TransportationMode>()
        .map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?;

    Ok(ItineraryRequest {
        place_a,
        place_b,
        transportation,
        depart_at: req.depart_at,
        arrive_by: req.arrive_by,
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// The request itself is unusable
    BadRequest { message: String },
    /// A pipeline stage failed
    Itinerary(ItineraryError),
}

impl AppError {
    fn query(field: &str, e: QueryError) -> Self {
        AppError::BadRequest {
            message: format!("{field}: {e}"),
        }
    }
}

impl From<ItineraryError> for AppError {
    fn from(e: ItineraryError) -> Self {
        AppError::Itinerary(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, stage, message) = match &self {
            AppError::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, "request", message.clone())
            }
            AppError::Itinerary(e) if e.is_upstream_unavailable() => {
                (StatusCode::BAD_GATEWAY, e.stage.as_str(), e.to_string())
            }
            AppError::Itinerary(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                e.stage.as_str(),
                e.to_string(),
            ),
        };

        if status.is_server_error() {
            error!(%status, stage, error = %message, "request failed");
        } else {
            warn!(%status, stage, error = %message, "request rejected");
        }

        let body = Json(ErrorResponse {
            stage: stage.to_string(),
            error: message,
        });
        (status, body).into_response()
    }
}
