//! Strongly-typed place query shapes.

use std::fmt;

use serde::Serialize;

use crate::domain::Coordinates;

/// Fields requested from find-place when the caller names none.
const DEFAULT_FIND_PLACE_FIELDS: &str =
    "place_id,name,formatted_address,plus_code,geometry,types,user_ratings_total,opening_hours,photos";

/// Which of the three query shapes a query is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QueryKind {
    NearbySearch,
    FindPlace,
    TextSearch,
}

impl QueryKind {
    /// Priority order used when matching untyped parameters.
    pub const PRIORITY: [QueryKind; 3] = [
        QueryKind::NearbySearch,
        QueryKind::FindPlace,
        QueryKind::TextSearch,
    ];

    /// Provider endpoint segment for this shape.
    pub fn endpoint(self) -> &'static str {
        match self {
            QueryKind::NearbySearch => "nearbysearch",
            QueryKind::FindPlace => "findplacefromtext",
            QueryKind::TextSearch => "textsearch",
        }
    }

    /// Keys that must be present.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            QueryKind::NearbySearch => &["location", "radius"],
            QueryKind::FindPlace => &["text_input", "input_type"],
            QueryKind::TextSearch => &["query", "radius"],
        }
    }

    /// Keys that may be present.
    pub fn optional_fields(self) -> &'static [&'static str] {
        match self {
            QueryKind::NearbySearch => &["keyword", "language", "price_range", "open_now", "place_type"],
            QueryKind::FindPlace => &["fields", "language"],
            QueryKind::TextSearch => &[
                "language",
                "location",
                "price_range",
                "open_now",
                "region",
                "place_type",
            ],
        }
    }

    /// Whether `key` belongs to this shape.
    pub fn accepts(self, key: &str) -> bool {
        self.required_fields().contains(&key) || self.optional_fields().contains(&key)
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// How find-place should interpret its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InputType {
    Text,
    Phone,
}

impl InputType {
    /// Accepts `text`/`textquery` and `phone`/`phonenumber`, any case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "textquery" => Some(InputType::Text),
            "phone" | "phonenumber" => Some(InputType::Phone),
            _ => None,
        }
    }

    pub fn provider_value(self) -> &'static str {
        match self {
            InputType::Text => "textquery",
            InputType::Phone => "phonenumber",
        }
    }
}

/// Places near a point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbySearch {
    pub location: Coordinates,
    /// Meters, strictly positive
    pub radius: f64,
    pub keyword: Option<String>,
    pub language: Option<String>,
    /// Price level 0..=4
    pub price_range: Option<u8>,
    pub open_now: Option<bool>,
    pub place_type: Option<String>,
}

/// A single place matching a text or phone number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindPlace {
    pub text_input: String,
    pub input_type: InputType,
    pub fields: Vec<String>,
    pub language: Option<String>,
}

/// Free-text search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextSearch {
    pub query: String,
    /// Meters
    pub radius: u32,
    pub language: Option<String>,
    pub location: Option<Coordinates>,
    pub price_range: Option<u8>,
    pub open_now: Option<bool>,
    pub region: Option<String>,
    pub place_type: Option<String>,
}

/// A resolved place query: exactly one of the supported shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlaceQuery {
    NearbySearch(NearbySearch),
    FindPlace(FindPlace),
    TextSearch(TextSearch),
}

impl PlaceQuery {
    pub fn kind(&self) -> QueryKind {
        match self {
            PlaceQuery::NearbySearch(_) => QueryKind::NearbySearch,
            PlaceQuery::FindPlace(_) => QueryKind::FindPlace,
            PlaceQuery::TextSearch(_) => QueryKind::TextSearch,
        }
    }

    /// Short human-readable description, used in logs and fixture lookup.
    pub fn search_text(&self) -> String {
        match self {
            PlaceQuery::NearbySearch(q) => q
                .keyword
                .clone()
                .unwrap_or_else(|| q.location.to_string()),
            PlaceQuery::FindPlace(q) => q.text_input.clone(),
            PlaceQuery::TextSearch(q) => q.query.clone(),
        }
    }

    /// Provider query-string parameters (API key excluded).
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        match self {
            PlaceQuery::NearbySearch(q) => {
                params.push(("location", q.location.to_string()));
                params.push(("radius", q.radius.to_string()));
                push_opt(&mut params, "keyword", q.keyword.as_ref());
                push_opt(&mut params, "language", q.language.as_ref());
                push_price(&mut params, q.price_range);
                push_open_now(&mut params, q.open_now);
                push_opt(&mut params, "type", q.place_type.as_ref());
            }
            PlaceQuery::FindPlace(q) => {
                params.push(("input", q.text_input.clone()));
                params.push(("inputtype", q.input_type.provider_value().to_string()));
                let fields = if q.fields.is_empty() {
                    DEFAULT_FIND_PLACE_FIELDS.to_string()
                } else {
                    q.fields.join(",")
                };
                params.push(("fields", fields));
                push_opt(&mut params, "language", q.language.as_ref());
            }
            PlaceQuery::TextSearch(q) => {
                params.push(("query", q.query.clone()));
                params.push(("radius", q.radius.to_string()));
                push_opt(&mut params, "language", q.language.as_ref());
                if let Some(location) = &q.location {
                    params.push(("location", location.to_string()));
                }
                push_price(&mut params, q.price_range);
                push_open_now(&mut params, q.open_now);
                push_opt(&mut params, "region", q.region.as_ref());
                push_opt(&mut params, "type", q.place_type.as_ref());
            }
        }
        params
    }
}

fn push_opt(params: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&String>) {
    if let Some(value) = value {
        params.push((key, value.clone()));
    }
}

/// A single price level is sent as both bounds.
fn push_price(params: &mut Vec<(&'static str, String)>, level: Option<u8>) {
    if let Some(level) = level {
        params.push(("minprice", level.to_string()));
        params.push(("maxprice", level.to_string()));
    }
}

/// The provider treats `opennow` as a flag: present means true.
fn push_open_now(params: &mut Vec<(&'static str, String)>, open_now: Option<bool>) {
    if open_now == Some(true) {
        params.push(("opennow", "true".to_string()));
    }
}
