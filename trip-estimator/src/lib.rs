//! Trip estimator server.
//!
//! Estimates the cost and duration of a trip between two places by
//! combining place, route, traffic and fuel price lookups into a single
//! itinerary.

pub mod cache;
pub mod config;
pub mod cost;
pub mod domain;
pub mod itinerary;
pub mod mock;
pub mod places;
pub mod query;
pub mod routing;
pub mod traffic;
pub mod upstream;
pub mod web;
