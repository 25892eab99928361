//! Route resolution between two resolved places.
//!
//! [`RouteRequest`] carries the place IDs, transportation mode and
//! optional time window; a [`RouteFetcher`] returns the provider payload and
//! [`RouteResolver`] turns it into a validated [`Route`](crate::domain::Route).

mod client;
mod request;
mod resolve;
mod types;

pub use client::{DEFAULT_BASE_URL, RouteClient, RouteFetcher};
pub use request::RouteRequest;
pub use resolve::{RouteResolver, parse_route};
pub use types::{
    LatLngDto, LegDto, LocationDto, Money, Numeric, PolylineDto, RouteDto, RoutesResponse,
    TravelAdvisory,
};
