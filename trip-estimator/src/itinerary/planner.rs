//! The itinerary pipeline.
//!
//! Both places are resolved concurrently, then the route, traffic and cost
//! stages run in order, each feeding the next. The first failure ends the
//! run and is reported with the stage it came from.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::cost::{CostEstimator, FuelPriceFetcher, TrafficWeight};
use crate::domain::{TourItinerary, TransportationMode};
use crate::places::{PlaceFetcher, PlaceResolver};
use crate::query::PlaceQuery;
use crate::routing::{RouteFetcher, RouteRequest, RouteResolver};
use crate::traffic::{TrafficFetcher, TrafficResolver};

use super::error::{ItineraryError, Stage};

/// A trip to estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct ItineraryRequest {
    /// Where the trip starts.
    pub place_a: PlaceQuery,

    /// Where the trip ends.
    pub place_b: PlaceQuery,

    pub transportation: TransportationMode,

    /// Requested departure, forwarded to the route lookup.
    pub depart_at: Option<DateTime<Utc>>,

    /// Requested arrival, forwarded to the route lookup.
    pub arrive_by: Option<DateTime<Utc>>,
}

impl ItineraryRequest {
    pub fn new(place_a: PlaceQuery, place_b: PlaceQuery, transportation: TransportationMode) -> Self {
        Self {
            place_a,
            place_b,
            transportation,
            depart_at: None,
            arrive_by: None,
        }
    }

    pub fn with_depart_at(mut self, at: DateTime<Utc>) -> Self {
        self.depart_at = Some(at);
        self
    }

    pub fn with_arrive_by(mut self, by: DateTime<Utc>) -> Self {
        self.arrive_by = Some(by);
        self
    }
}

/// Runs the place, route, traffic and cost stages to build an itinerary.
#[derive(Debug, Clone)]
pub struct ItineraryPlanner<P, R, T, F> {
    places: PlaceResolver<P>,
    routes: RouteResolver<R>,
    traffic: TrafficResolver<T>,
    cost: CostEstimator<F>,
}

impl<P, R, T, F> ItineraryPlanner<P, R, T, F>
where
    P: PlaceFetcher,
    R: RouteFetcher,
    T: TrafficFetcher,
    F: FuelPriceFetcher,
{
    pub fn new(
        places: PlaceResolver<P>,
        routes: RouteResolver<R>,
        traffic: TrafficResolver<T>,
        cost: CostEstimator<F>,
    ) -> Self {
        Self {
            places,
            routes,
            traffic,
            cost,
        }
    }

    /// Plan a trip departing now.
    pub async fn plan(&self, request: &ItineraryRequest) -> Result<TourItinerary, ItineraryError> {
        self.plan_at(request, Utc::now()).await
    }

    /// Plan a trip with `now` as the current time.
    ///
    /// The departure time is `depart_at` when given, otherwise `now`.
    ///
    /// # Errors
    ///
    /// The first failing stage, tagged with that stage. If either place
    /// lookup fails the other is dropped and no later stage runs.
    pub async fn plan_at(
        &self,
        request: &ItineraryRequest,
        now: DateTime<Utc>,
    ) -> Result<TourItinerary, ItineraryError> {
        let mode = request.transportation;
        info!(
            from = %request.place_a.search_text(),
            to = %request.place_b.search_text(),
            %mode,
            "planning itinerary"
        );

        let result = self.run(request, mode, now).await;
        if let Err(e) = &result {
            warn!(stage = %e.stage, error = %e, "itinerary planning failed");
        }
        result
    }

    async fn run(
        &self,
        request: &ItineraryRequest,
        mode: TransportationMode,
        now: DateTime<Utc>,
    ) -> Result<TourItinerary, ItineraryError> {
        debug!(stage = %Stage::StartPlace, "resolving places");
        let (start, end) = tokio::try_join!(
            async {
                self.places
                    .resolve(&request.place_a)
                    .await
                    .map_err(|e| ItineraryError::new(Stage::StartPlace, e))
            },
            async {
                self.places
                    .resolve(&request.place_b)
                    .await
                    .map_err(|e| ItineraryError::new(Stage::EndPlace, e))
            },
        )?;

        debug!(stage = %Stage::Route, origin = %start.place_id, destination = %end.place_id, "resolving route");
        let route_request = RouteRequest::new(
            &start.place_id,
            &end.place_id,
            mode,
            request.depart_at,
            request.arrive_by,
            now,
        )
        .map_err(|e| ItineraryError::new(Stage::Route, e))?;
        let route = self
            .routes
            .resolve(&route_request)
            .await
            .map_err(|e| ItineraryError::new(Stage::Route, e))?;

        debug!(stage = %Stage::Traffic, distance = route.distance(), duration = route.duration(), "resolving traffic");
        let condition = self
            .traffic
            .resolve(route.polyline(), mode)
            .await
            .map_err(|e| ItineraryError::new(Stage::Traffic, e))?;
        let weight = TrafficWeight::from_level(condition.level());

        debug!(stage = %Stage::Cost, %weight, "estimating cost");
        let cost = self
            .cost
            .estimate(route.distance(), route.duration(), weight)
            .await
            .map_err(|e| ItineraryError::new(Stage::Cost, e))?;

        let departure = request.depart_at.unwrap_or(now);
        let itinerary = TourItinerary::new(start, end, route, departure, cost)
            .map_err(|e| ItineraryError::new(Stage::Route, e))?;
        info!(
            start = %itinerary.start_point.name,
            end = %itinerary.end_point.name,
            arrival = %itinerary.arrival_time,
            estimated_cost = itinerary.cost_estimate.estimated_cost,
            "itinerary assembled"
        );
        Ok(itinerary)
    }
}
