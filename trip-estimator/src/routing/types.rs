//! Route lookup response DTOs.
//!
//! The provider encodes 64-bit integers as JSON strings, so integer-valued
//! fields accept either form through [`Numeric`].

use serde::Deserialize;

use crate::upstream::null_as_default;

/// A number that may arrive as a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Numeric::Number(n) => Some(*n),
            Numeric::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Response from `computeRoutes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoutesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub routes: Vec<RouteDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDto {
    /// Seconds with an `s` suffix, e.g. `"12960s"`
    pub duration: Option<String>,
    pub distance_meters: Option<Numeric>,
    pub polyline: Option<PolylineDto>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub legs: Vec<LegDto>,

    pub travel_advisory: Option<TravelAdvisory>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolylineDto {
    pub encoded_polyline: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegDto {
    pub start_location: Option<LocationDto>,
    pub end_location: Option<LocationDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDto {
    pub lat_lng: Option<LatLngDto>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLngDto {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelAdvisory {
    pub transit_fare: Option<Money>,
    pub fuel_consumption_microliters: Option<Numeric>,
}

/// Fixed-point money: `units + nanos / 1e9`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub currency_code: Option<String>,
    pub units: Option<Numeric>,
    pub nanos: Option<i64>,
}

impl Money {
    pub fn amount(&self) -> f64 {
        let units = self.units.as_ref().and_then(Numeric::as_f64).unwrap_or(0.0);
        let nanos = self.nanos.unwrap_or(0) as f64;
        units + nanos / 1e9
    }
}
