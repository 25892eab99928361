//! Place query resolution.
//!
//! Callers describe a place with loosely-typed parameters (a JSON object).
//! `resolve_query` decides which of the supported lookup shapes those
//! parameters describe and validates them into a [`PlaceQuery`], which
//! knows its provider endpoint and query-string form.

mod resolve;
mod types;

pub use resolve::{QueryError, resolve_query};
pub use types::{FindPlace, InputType, NearbySearch, PlaceQuery, QueryKind, TextSearch};
