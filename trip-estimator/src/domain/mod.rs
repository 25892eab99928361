//! Domain types for the trip estimator.
//!
//! This module contains the validated entities produced by the resolvers
//! and the cost estimator. Types with invariants enforce them at
//! construction (or in `validate`), so code receiving them can trust
//! their contents.

mod coordinates;
mod cost;
mod error;
mod itinerary;
mod place;
pub mod polyline;
mod route;
mod traffic;

pub use coordinates::{BoundingBox, Coordinates};
pub use cost::{CostComponents, CostEstimate, Currency};
pub use error::DomainError;
pub use itinerary::TourItinerary;
pub use place::{DayHours, Location, OpeningHours, Picture, PlaceInfo, Review, weekday_name};
pub use polyline::MalformedPolyline;
pub use route::{Route, Transportation, TransportationMode, UnknownTransportationMode};
pub use traffic::{
    FlowSegment, Incident, IncidentType, RoadType, TrafficCondition, TrafficLevel,
    UnknownTrafficCondition,
};
