//! Resolve untyped query parameters into a `PlaceQuery`.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::domain::Coordinates;

use super::types::{FindPlace, InputType, NearbySearch, PlaceQuery, QueryKind, TextSearch};

/// Highest provider price level.
const MAX_PRICE_LEVEL: u64 = 4;

/// Errors from query resolution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    /// No parameters were supplied
    #[error("Empty query")]
    Empty,

    /// The supplied keys match no shape, or more than one
    #[error("ambiguous or unknown query with keys [{}]", keys.join(", "))]
    AmbiguousOrUnknown { keys: Vec<String> },

    /// The shape is clear but a value is missing or wrong
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },
}

impl QueryError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        QueryError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Map provider spellings onto canonical field names.
fn canonical_key(key: &str) -> &str {
    match key {
        "input" => "text_input",
        "inputtype" => "input_type",
        "type" => "place_type",
        "opennow" => "open_now",
        other => other,
    }
}

/// Determine which query shape `params` describes and build it.
///
/// A shape is a candidate when every supplied key is one of its fields.
/// Candidates are considered in the order nearby search, find place,
/// text search. A lone candidate is built directly; several candidates are
/// narrowed to those whose required keys are all present, and exactly one
/// must remain. Keys with `null` values count as absent.
///
/// # Errors
///
/// - [`QueryError::Empty`] when there are no (non-null) parameters
/// - [`QueryError::AmbiguousOrUnknown`] when zero or several shapes fit
/// - [`QueryError::InvalidInput`] when the chosen shape lacks a required
///   field or a value fails validation
///
/// # Example
///
/// ```
/// use trip_estimator::query::{resolve_query, QueryKind};
///
/// let params = serde_json::json!({"query": "churrasco", "radius": 1200});
/// let query = resolve_query(params.as_object().unwrap()).unwrap();
/// assert_eq!(query.kind(), QueryKind::TextSearch);
/// ```
pub fn resolve_query(params: &Map<String, Value>) -> Result<PlaceQuery, QueryError> {
    let fields = Fields::canonicalize(params)?;
    if fields.is_empty() {
        return Err(QueryError::Empty);
    }

    let candidates: Vec<QueryKind> = QueryKind::PRIORITY
        .into_iter()
        .filter(|kind| fields.keys().all(|key| kind.accepts(key)))
        .collect();

    let kind = match candidates.as_slice() {
        [] => return Err(fields.ambiguous()),
        [only] => *only,
        several => {
            let complete: Vec<QueryKind> = several
                .iter()
                .copied()
                .filter(|kind| fields.has_all(kind.required_fields()))
                .collect();
            match complete.as_slice() {
                [only] => *only,
                _ => return Err(fields.ambiguous()),
            }
        }
    };

    build(kind, &fields)
}

fn build(kind: QueryKind, fields: &Fields<'_>) -> Result<PlaceQuery, QueryError> {
    if let Some(missing) = kind
        .required_fields()
        .iter()
        .find(|key| !fields.contains(key))
    {
        return Err(QueryError::invalid(missing, format!("required for {kind}")));
    }

    let query = match kind {
        QueryKind::NearbySearch => PlaceQuery::NearbySearch(NearbySearch {
            location: fields.required_coordinates("location")?,
            radius: fields.positive_radius("radius")?,
            keyword: fields.string("keyword")?,
            language: fields.string("language")?,
            price_range: fields.price_level("price_range")?,
            open_now: fields.boolean("open_now")?,
            place_type: fields.string("place_type")?,
        }),
        QueryKind::FindPlace => PlaceQuery::FindPlace(FindPlace {
            text_input: fields.required_string("text_input")?,
            input_type: fields.input_type("input_type")?,
            fields: fields.list("fields")?,
            language: fields.string("language")?,
        }),
        QueryKind::TextSearch => PlaceQuery::TextSearch(TextSearch {
            query: fields.required_string("query")?,
            radius: fields.whole_radius("radius")?,
            language: fields.string("language")?,
            location: fields.coordinates("location")?,
            price_range: fields.price_level("price_range")?,
            open_now: fields.boolean("open_now")?,
            region: fields.string("region")?,
            place_type: fields.string("place_type")?,
        }),
    };
    Ok(query)
}

/// Non-null parameters under their canonical names.
struct Fields<'a> {
    values: BTreeMap<String, &'a Value>,
}

impl<'a> Fields<'a> {
    fn canonicalize(params: &'a Map<String, Value>) -> Result<Self, QueryError> {
        let mut values = BTreeMap::new();
        for (key, value) in params.iter().filter(|(_, v)| !v.is_null()) {
            let canonical = canonical_key(key);
            if values.insert(canonical.to_string(), value).is_some() {
                return Err(QueryError::invalid(canonical, "given more than once"));
            }
        }
        Ok(Self { values })
    }

    fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn has_all(&self, keys: &[&str]) -> bool {
        keys.iter().all(|key| self.contains(key))
    }

    fn ambiguous(&self) -> QueryError {
        QueryError::AmbiguousOrUnknown {
            keys: self.values.keys().cloned().collect(),
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.values.get(key).copied()
    }

    fn string(&self, key: &str) -> Result<Option<String>, QueryError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => {
                Err(QueryError::invalid(key, "must not be blank"))
            }
            Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
            Some(_) => Err(QueryError::invalid(key, "expected a string")),
        }
    }

    fn required_string(&self, key: &str) -> Result<String, QueryError> {
        self.string(key)?
            .ok_or_else(|| QueryError::invalid(key, "missing"))
    }

    fn boolean(&self, key: &str) -> Result<Option<bool>, QueryError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(QueryError::invalid(key, "expected true or false")),
        }
    }

    fn positive_radius(&self, key: &str) -> Result<f64, QueryError> {
        let radius = self
            .get(key)
            .and_then(Value::as_f64)
            .ok_or_else(|| QueryError::invalid(key, "expected a number"))?;
        if radius > 0.0 && radius.is_finite() {
            Ok(radius)
        } else {
            Err(QueryError::invalid(key, format!("{radius} is not positive")))
        }
    }

    fn whole_radius(&self, key: &str) -> Result<u32, QueryError> {
        self.get(key)
            .and_then(Value::as_u64)
            .and_then(|r| u32::try_from(r).ok())
            .ok_or_else(|| QueryError::invalid(key, "expected a non-negative integer"))
    }

    fn price_level(&self, key: &str) -> Result<Option<u8>, QueryError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .filter(|level| *level <= MAX_PRICE_LEVEL)
                .and_then(|level| u8::try_from(level).ok())
                .map(Some)
                .ok_or_else(|| QueryError::invalid(key, "expected an integer from 0 to 4")),
        }
    }

    fn input_type(&self, key: &str) -> Result<InputType, QueryError> {
        let raw = self.required_string(key)?;
        InputType::parse(&raw)
            .ok_or_else(|| QueryError::invalid(key, format!("unknown input type {raw:?}")))
    }

    /// A comma-separated string or an array of strings.
    fn list(&self, key: &str) -> Result<Vec<String>, QueryError> {
        let items: Vec<String> = match self.get(key) {
            None => return Ok(Vec::new()),
            Some(Value::String(s)) => s.split(',').map(|f| f.trim().to_string()).collect(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(|s| s.trim().to_string())
                        .ok_or_else(|| QueryError::invalid(key, "expected strings"))
                })
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(QueryError::invalid(key, "expected a string or list")),
        };
        Ok(items.into_iter().filter(|f| !f.is_empty()).collect())
    }

    fn required_coordinates(&self, key: &str) -> Result<Coordinates, QueryError> {
        self.coordinates(key)?
            .ok_or_else(|| QueryError::invalid(key, "missing"))
    }

    /// `{latitude, longitude}`, `{lat, lng}` or `"lat,lng"`.
    fn coordinates(&self, key: &str) -> Result<Option<Coordinates>, QueryError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let (lat, lng) = match value {
            Value::Object(obj) => {
                let lat = obj.get("latitude").or_else(|| obj.get("lat"));
                let lng = obj.get("longitude").or_else(|| obj.get("lng"));
                (lat.and_then(Value::as_f64), lng.and_then(Value::as_f64))
            }
            Value::String(s) => match s.split_once(',') {
                Some((lat, lng)) => (lat.trim().parse().ok(), lng.trim().parse().ok()),
                None => (None, None),
            },
            _ => (None, None),
        };
        let (Some(lat), Some(lng)) = (lat, lng) else {
            return Err(QueryError::invalid(key, "expected latitude and longitude"));
        };
        Coordinates::new(lat, lng)
            .map(Some)
            .map_err(|e| QueryError::invalid(key, e.to_string()))
    }
}
