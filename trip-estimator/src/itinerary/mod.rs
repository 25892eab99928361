//! Itinerary orchestration.
//!
//! [`ItineraryPlanner`] composes the place, route, traffic and cost
//! lookups into a [`TourItinerary`](crate::domain::TourItinerary).
//! Failures carry the [`Stage`] that produced them.

mod error;
mod planner;

#[cfg(test)]
mod planner_tests;

pub use error::{ItineraryError, Stage, StageError};
pub use planner::{ItineraryPlanner, ItineraryRequest};
