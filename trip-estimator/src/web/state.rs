//! Application state for the web layer.

use std::sync::Arc;

use crate::itinerary::ItineraryPlanner;

/// Shared application state.
///
/// Generic over the fetchers so the server can run against live
/// providers or fixtures.
pub struct AppState<P, R, T, F> {
    /// Itinerary pipeline
    pub planner: Arc<ItineraryPlanner<P, R, T, F>>,
}

impl<P, R, T, F> AppState<P, R, T, F> {
    /// Create a new app state.
    pub fn new(planner: ItineraryPlanner<P, R, T, F>) -> Self {
        Self {
            planner: Arc::new(planner),
        }
    }
}

impl<P, R, T, F> Clone for AppState<P, R, T, F> {
    fn clone(&self) -> Self {
        Self {
            planner: Arc::clone(&self.planner),
        }
    }
}
