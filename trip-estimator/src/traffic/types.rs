//! Traffic provider response DTOs.

use serde::Deserialize;
use serde_json::Value;

use crate::upstream::null_as_default;

/// Response from the incident details endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncidentsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub incidents: Vec<IncidentDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncidentDto {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub geometry: Option<IncidentGeometry>,
    pub properties: Option<IncidentProperties>,
}

/// GeoJSON-style geometry. Coordinates are `[lon, lat]` for a `Point`
/// and a list of those for a `LineString`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncidentGeometry {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub coordinates: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentProperties {
    pub icon_category: Option<i64>,
}

/// Response from the flow segment endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowResponse {
    pub flow_segment_data: Option<FlowSegmentData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSegmentData {
    pub frc: Option<String>,
    pub current_speed: Option<f64>,
    pub free_flow_speed: Option<f64>,
    pub confidence: Option<f64>,
    pub current_travel_time: Option<f64>,
    pub free_flow_travel_time: Option<f64>,
    pub road_closure: Option<bool>,
    pub coordinates: Option<FlowCoordinates>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowCoordinates {
    #[serde(default, deserialize_with = "null_as_default")]
    pub coordinate: Vec<FlowPoint>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FlowPoint {
    pub latitude: f64,
    pub longitude: f64,
}
