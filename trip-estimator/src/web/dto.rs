//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request to estimate a trip.
#[derive(Debug, Deserialize)]
pub struct TravelRequest {
    /// Untyped query for the start place
    #[serde(alias = "place_a_query")]
    pub place_a: Map<String, Value>,

    /// Untyped query for the end place
    #[serde(alias = "place_b_query")]
    pub place_b: Map<String, Value>,

    /// `car`, `bike`, `bus`, `train` or `walk`
    pub transportation_method: String,

    #[serde(default)]
    pub depart_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub arrive_by: Option<DateTime<Utc>>,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Where the request failed: `request` or a pipeline stage
    pub stage: String,
    pub error: String,
}
