//! Traffic conditions along a route.
//!
//! The route polyline is decoded, incidents are fetched for a small box
//! around its midpoint, and flow is sampled at points spread along it.
//! Both feeds are combined into a [`TrafficCondition`](crate::domain::TrafficCondition).

mod client;
mod resolve;
mod types;

pub use client::{DEFAULT_BASE_URL, TrafficClient, TrafficFetcher};
pub use resolve::{
    BBOX_DELTA, DEFAULT_MAX_FLOW_SAMPLES, TrafficResolver, parse_flow, parse_incidents,
    sample_points,
};
pub use types::{
    FlowCoordinates, FlowPoint, FlowResponse, FlowSegmentData, IncidentDto, IncidentGeometry,
    IncidentProperties, IncidentsResponse,
};
