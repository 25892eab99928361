//! Conversion from route DTOs to a validated `Route`.

use tracing::debug;

use crate::domain::{Coordinates, Route, Transportation, TransportationMode};
use crate::upstream::{ProviderError, parse_json};

use super::client::RouteFetcher;
use super::request::RouteRequest;
use super::types::{LocationDto, Numeric, RoutesResponse};

/// Resolves a route request into a validated `Route`.
#[derive(Debug, Clone)]
pub struct RouteResolver<F> {
    fetcher: F,
}

impl<F: RouteFetcher> RouteResolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub async fn resolve(&self, request: &RouteRequest) -> Result<Route, ProviderError> {
        let body = self.fetcher.fetch_route(request).await?;
        let route = parse_route(&body, request.mode())?;

        debug!(
            minutes = route.duration(),
            meters = route.distance(),
            "resolved route"
        );
        Ok(route)
    }
}

/// Parse the first route of a `computeRoutes` body.
///
/// Endpoints come from the first leg. Fare and fuel consumption are
/// optional; everything else is required.
pub fn parse_route(body: &str, mode: TransportationMode) -> Result<Route, ProviderError> {
    let response: RoutesResponse = parse_json(body)?;
    let route = response
        .routes
        .first()
        .ok_or(ProviderError::MissingField("routes"))?;

    let leg = route
        .legs
        .first()
        .ok_or(ProviderError::MissingField("routes[0].legs"))?;
    let origin = leg_point(leg.start_location.as_ref(), "legs[0].startLocation")?;
    let destination = leg_point(leg.end_location.as_ref(), "legs[0].endLocation")?;

    let polyline = route
        .polyline
        .as_ref()
        .and_then(|p| p.encoded_polyline.clone())
        .ok_or(ProviderError::MissingField("polyline.encodedPolyline"))?;

    let raw_duration = route
        .duration
        .as_deref()
        .ok_or(ProviderError::MissingField("duration"))?;
    let minutes = parse_duration_minutes(raw_duration).ok_or_else(|| {
        ProviderError::malformed(format!("invalid duration {raw_duration:?}"), body)
    })?;

    let meters = route
        .distance_meters
        .as_ref()
        .ok_or(ProviderError::MissingField("distanceMeters"))?
        .as_f64()
        .ok_or_else(|| ProviderError::malformed("invalid distanceMeters", body))?;

    let mut transportation = Transportation::new(mode);
    if let Some(advisory) = &route.travel_advisory {
        transportation.fare = advisory.transit_fare.as_ref().map(|m| m.amount());
        transportation.details = advisory
            .fuel_consumption_microliters
            .as_ref()
            .map(numeric_text);
    }

    Ok(Route::new(
        origin,
        destination,
        polyline,
        minutes,
        meters,
        transportation,
    )?)
}

fn leg_point(
    location: Option<&LocationDto>,
    field: &'static str,
) -> Result<Coordinates, ProviderError> {
    let lat_lng = location
        .and_then(|l| l.lat_lng)
        .ok_or(ProviderError::MissingField(field))?;
    Ok(Coordinates::new(lat_lng.latitude, lat_lng.longitude)?)
}

/// `"12960s"` -> 216.0
fn parse_duration_minutes(raw: &str) -> Option<f64> {
    let seconds: f64 = raw.trim().strip_suffix('s')?.parse().ok()?;
    seconds.is_finite().then_some(seconds / 60.0)
}

fn numeric_text(value: &Numeric) -> String {
    match value {
        Numeric::Text(s) => s.clone(),
        Numeric::Number(n) => n.to_string(),
    }
}
