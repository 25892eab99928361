//! Place resolution.
//!
//! A [`PlaceFetcher`] returns the raw provider payload for a
//! [`PlaceQuery`](crate::query::PlaceQuery); [`PlaceResolver`] parses it
//! into a validated [`PlaceInfo`](crate::domain::PlaceInfo). Only
//! `place_id` and the location are required; display data (reviews,
//! photos, opening hours) falls back to empty defaults.

mod client;
mod resolve;
mod types;

pub use client::{DEFAULT_BASE_URL, PlaceClient, PlaceFetcher};
pub use resolve::{
    PlaceResolver, convert_opening_hours, convert_place, parse_first_place, parse_places,
};
pub use types::{
    DayTime, Geometry, LatLng, OpeningHoursDto, PeriodDto, PhotoDto, PlaceResult, PlacesResponse,
    PlusCode, ReviewDto,
};
