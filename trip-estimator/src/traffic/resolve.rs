//! Traffic resolution along a route.

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{
    BoundingBox, Coordinates, FlowSegment, Incident, IncidentType, RoadType, TrafficCondition,
    TransportationMode, polyline,
};
use crate::upstream::{ProviderError, parse_json};

use super::client::TrafficFetcher;
use super::types::{FlowResponse, IncidentDto, IncidentsResponse};

/// Half-width in degrees of the incident search box.
pub const BBOX_DELTA: f64 = 0.01;

/// Default number of points sampled for flow.
pub const DEFAULT_MAX_FLOW_SAMPLES: usize = 8;

/// Resolves a route polyline into a `TrafficCondition`.
#[derive(Debug, Clone)]
pub struct TrafficResolver<F> {
    fetcher: F,
    max_flow_samples: usize,
}

impl<F: TrafficFetcher> TrafficResolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            max_flow_samples: DEFAULT_MAX_FLOW_SAMPLES,
        }
    }

    /// Set how many points along the route are sampled for flow.
    pub fn with_max_flow_samples(mut self, n: usize) -> Self {
        self.max_flow_samples = n;
        self
    }

    /// Fetch incidents around the route midpoint and flow at sampled
    /// points, concurrently.
    ///
    /// # Errors
    ///
    /// Fails if the polyline is malformed, the incident fetch fails, or
    /// every flow sample fails. Individual failing samples are skipped.
    pub async fn resolve(
        &self,
        encoded: &str,
        mode: TransportationMode,
    ) -> Result<TrafficCondition, ProviderError> {
        let path = polyline::decode(encoded)?;
        let bbox = BoundingBox::around_midpoint(&path, BBOX_DELTA)
            .ok_or(ProviderError::MissingField("polyline"))?;
        let samples = sample_points(&path, self.max_flow_samples);

        debug!(%bbox, samples = samples.len(), %mode, "resolving traffic");

        let (incidents, flows) = tokio::join!(
            self.fetcher.fetch_incidents(&bbox),
            join_all(samples.iter().map(|point| self.fetcher.fetch_flow(point)))
        );
        let incidents = parse_incidents(&incidents?)?;

        let mut segments = Vec::with_capacity(samples.len());
        let mut last_error = None;
        for (point, result) in samples.iter().zip(flows) {
            match result.and_then(|body| parse_flow(&body)) {
                Ok(segment) => segments.push(segment),
                Err(e) => {
                    warn!(%point, error = %e, "skipping flow sample");
                    last_error = Some(e);
                }
            }
        }
        if segments.is_empty() {
            if let Some(last) = last_error {
                return Err(ProviderError::Exhausted {
                    attempts: samples.len(),
                    last: Box::new(last),
                });
            }
        }

        let condition = TrafficCondition::new(segments, incidents);
        debug!(
            impact = condition.traffic_impact,
            incidents = condition.incidents.len(),
            level = %condition.level(),
            "resolved traffic"
        );
        Ok(condition)
    }
}

/// Up to `max` points spread evenly along `path`, endpoints included.
pub fn sample_points(path: &[Coordinates], max: usize) -> Vec<Coordinates> {
    match (path.len(), max) {
        (_, 0) | (0, _) => Vec::new(),
        (len, _) if len <= max => path.to_vec(),
        (len, 1) => vec![path[len / 2]],
        (len, max) => (0..max).map(|i| path[i * (len - 1) / (max - 1)]).collect(),
    }
}

/// Parse an incident details body.
///
/// Incidents without usable coordinates are skipped.
pub fn parse_incidents(body: &str) -> Result<Vec<Incident>, ProviderError> {
    let response: IncidentsResponse = parse_json(body)?;
    Ok(response.incidents.iter().filter_map(convert_incident).collect())
}

fn convert_incident(dto: &IncidentDto) -> Option<Incident> {
    let icon_category = dto
        .properties
        .as_ref()
        .and_then(|p| p.icon_category)
        .unwrap_or(0);

    let coordinates = dto
        .geometry
        .as_ref()
        .and_then(|g| g.coordinates.as_ref())
        .and_then(first_point);
    let Some(coordinates) = coordinates else {
        warn!(icon_category, "skipping incident without coordinates");
        return None;
    };

    Some(Incident {
        kind: IncidentType::from_icon_category(icon_category),
        coordinates,
        icon_category,
    })
}

/// First `[lon, lat]` pair of a Point or LineString coordinate array.
fn first_point(value: &Value) -> Option<Coordinates> {
    let items = value.as_array()?;
    let pair = match items.first()? {
        Value::Array(inner) => inner,
        Value::Number(_) => items,
        _ => return None,
    };
    let lon = pair.first()?.as_f64()?;
    let lat = pair.get(1)?.as_f64()?;
    Coordinates::new(lat, lon).ok()
}

/// Parse a flow segment body.
///
/// Travel times are required; missing confidence counts as full.
pub fn parse_flow(body: &str) -> Result<FlowSegment, ProviderError> {
    let response: FlowResponse = parse_json(body)?;
    let data = response
        .flow_segment_data
        .ok_or(ProviderError::MissingField("flowSegmentData"))?;

    let current_travel_time = data
        .current_travel_time
        .ok_or(ProviderError::MissingField("currentTravelTime"))?;
    let free_flow_travel_time = data
        .free_flow_travel_time
        .ok_or(ProviderError::MissingField("freeFlowTravelTime"))?;

    let path: Vec<Coordinates> = data
        .coordinates
        .map(|c| c.coordinate)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| Coordinates::new(p.latitude, p.longitude).ok())
        .collect();

    let frc = data.frc.unwrap_or_default();
    Ok(FlowSegment {
        road_type: RoadType::from_frc(&frc),
        frc,
        current_speed: data.current_speed.unwrap_or(0.0),
        free_flow_speed: data.free_flow_speed.unwrap_or(0.0),
        confidence: data.confidence.unwrap_or(1.0).clamp(0.0, 1.0),
        current_travel_time,
        free_flow_travel_time,
        road_closure: data.road_closure.unwrap_or(false),
        start_point: path.first().copied(),
        end_point: path.last().copied(),
    })
}
