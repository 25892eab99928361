//! Route lookup request.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value, json};

use crate::domain::{DomainError, TransportationMode};

/// A validated request for a route between two resolved places.
///
/// # Invariants
///
/// - Both place IDs are non-blank and differ
/// - Neither `depart_at` nor `arrive_by` is before the `now` given at
///   construction
/// - If both are present, `arrive_by` is strictly later than `depart_at`
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    origin: String,
    destination: String,
    mode: TransportationMode,
    depart_at: Option<DateTime<Utc>>,
    arrive_by: Option<DateTime<Utc>>,
}

impl RouteRequest {
    /// Create a request, checking the time window against `now`.
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        mode: TransportationMode,
        depart_at: Option<DateTime<Utc>>,
        arrive_by: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let origin = origin.into();
        let destination = destination.into();

        if origin.trim().is_empty() {
            return Err(DomainError::EmptyField("origin place_id"));
        }
        if destination.trim().is_empty() {
            return Err(DomainError::EmptyField("destination place_id"));
        }
        if origin == destination {
            return Err(DomainError::SameEndpoints);
        }
        if depart_at.is_some_and(|t| t < now) {
            return Err(DomainError::TimeInPast("depart_at"));
        }
        if arrive_by.is_some_and(|t| t < now) {
            return Err(DomainError::TimeInPast("arrive_by"));
        }
        if let (Some(depart), Some(arrive)) = (depart_at, arrive_by) {
            if arrive <= depart {
                return Err(DomainError::ArrivalNotAfterDeparture);
            }
        }

        Ok(Self {
            origin,
            destination,
            mode,
            depart_at,
            arrive_by,
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn mode(&self) -> TransportationMode {
        self.mode
    }

    pub fn depart_at(&self) -> Option<DateTime<Utc>> {
        self.depart_at
    }

    pub fn arrive_by(&self) -> Option<DateTime<Utc>> {
        self.arrive_by
    }

    /// JSON body for the compute-routes call.
    ///
    /// Traffic-aware routing is requested for driving only. An arrival
    /// deadline takes precedence over a departure time.
    pub fn payload(&self, language: &str) -> Value {
        let mut body = json!({
            "origin": {"placeId": self.origin},
            "destination": {"placeId": self.destination},
            "travelMode": self.mode.travel_mode(),
            "computeAlternativeRoutes": false,
            "routeModifiers": {
                "avoidTolls": false,
                "avoidHighways": false,
                "avoidFerries": false
            },
            "languageCode": language,
            "units": "METRIC"
        });

        if self.mode == TransportationMode::Car {
            body["routingPreference"] = json!("TRAFFIC_AWARE");
        }

        match (self.depart_at, self.arrive_by) {
            (_, Some(arrive)) => {
                body["arrivalTime"] = json!(arrive.to_rfc3339_opts(SecondsFormat::Secs, true));
            }
            (Some(depart), None) => {
                body["departureTime"] = json!(depart.to_rfc3339_opts(SecondsFormat::Secs, true));
            }
            (None, None) => {}
        }

        body
    }
}
