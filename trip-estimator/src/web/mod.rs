//! Web layer for the trip estimator.
//!
//! Exposes the itinerary pipeline as a single JSON endpoint.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
