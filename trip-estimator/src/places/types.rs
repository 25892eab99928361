//! Place lookup response DTOs.
//!
//! These map directly to the provider's JSON. Nearby and text search
//! return `results`, find-place returns `candidates`. Almost everything is
//! optional because the provider omits fields freely; required fields are
//! enforced during conversion instead.

use serde::Deserialize;

use crate::upstream::null_as_default;

/// Top-level response from any place lookup endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlacesResponse {
    /// `OK`, `ZERO_RESULTS`, `REQUEST_DENIED`, ...
    pub status: Option<String>,

    pub error_message: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<PlaceResult>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub candidates: Vec<PlaceResult>,
}

/// One place in a lookup response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceResult {
    pub place_id: Option<String>,
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub plus_code: Option<PlusCode>,
    pub geometry: Option<Geometry>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub types: Vec<String>,

    pub user_ratings_total: Option<u32>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub reviews: Vec<ReviewDto>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub photos: Vec<PhotoDto>,

    pub opening_hours: Option<OpeningHoursDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlusCode {
    pub global_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Geometry {
    pub location: Option<LatLng>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewDto {
    pub author_name: Option<String>,
    pub author_url: Option<String>,
    pub language: Option<String>,
    pub text: Option<String>,
    pub rating: Option<f64>,
    /// Unix seconds
    pub time: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoDto {
    pub photo_reference: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpeningHoursDto {
    #[serde(default, deserialize_with = "null_as_default")]
    pub periods: Vec<PeriodDto>,
}

/// An opening interval. A period without `close` means always open.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeriodDto {
    pub open: Option<DayTime>,
    pub close: Option<DayTime>,
}

/// A day (0 = Sunday) and an `HHMM` time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DayTime {
    pub day: Option<u8>,
    pub time: Option<String>,
}
