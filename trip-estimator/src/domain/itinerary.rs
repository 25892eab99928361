//! Tour itinerary: the assembled result.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::{CostEstimate, DomainError, PlaceInfo, Route, TransportationMode};

/// A complete trip estimate between two places.
///
/// `arrival_time` is always `departure_time` plus the route duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TourItinerary {
    pub start_point: PlaceInfo,
    pub end_point: PlaceInfo,
    pub route: Route,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub cost_estimate: CostEstimate,
    pub transportation_method: TransportationMode,
}

impl TourItinerary {
    /// Assemble an itinerary, deriving the arrival time from the route.
    ///
    /// # Errors
    ///
    /// [`DomainError::ArrivalOutOfRange`] if the arrival time cannot be
    /// represented.
    pub fn new(
        start_point: PlaceInfo,
        end_point: PlaceInfo,
        route: Route,
        departure_time: DateTime<Utc>,
        cost_estimate: CostEstimate,
    ) -> Result<Self, DomainError> {
        let out_of_range = DomainError::ArrivalOutOfRange {
            duration: route.duration(),
        };
        let millis = (route.duration() * 60_000.0).round();
        if !(millis.is_finite() && millis.abs() < i64::MAX as f64) {
            return Err(out_of_range);
        }
        let arrival_time = Duration::try_milliseconds(millis as i64)
            .and_then(|travel| departure_time.checked_add_signed(travel))
            .ok_or(out_of_range)?;

        let transportation_method = route.transportation().mode;
        Ok(Self {
            start_point,
            end_point,
            departure_time,
            arrival_time,
            cost_estimate,
            transportation_method,
            route,
        })
    }

    /// Travel time between departure and arrival.
    pub fn travel_time(&self) -> Duration {
        self.arrival_time - self.departure_time
    }
}
