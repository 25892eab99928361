//! Conversion from place DTOs to domain types, and the place resolver.

use chrono::{DateTime, NaiveTime, Weekday};
use tracing::{debug, warn};

use crate::domain::{
    Coordinates, DayHours, Location, OpeningHours, Picture, PlaceInfo, Review,
};
use crate::query::PlaceQuery;
use crate::upstream::{ProviderError, parse_json};

use super::client::PlaceFetcher;
use super::types::{OpeningHoursDto, PhotoDto, PlaceResult, PlacesResponse, ReviewDto};

/// Resolves a place query into a validated `PlaceInfo`.
#[derive(Debug, Clone)]
pub struct PlaceResolver<F> {
    fetcher: F,
}

impl<F: PlaceFetcher> PlaceResolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Fetch, parse and validate the best match for `query`.
    ///
    /// # Errors
    ///
    /// Upstream failures propagate unchanged. An empty result list is
    /// [`ProviderError::NoResults`].
    pub async fn resolve(&self, query: &PlaceQuery) -> Result<PlaceInfo, ProviderError> {
        let body = self.fetcher.fetch_place(query).await?;
        let place = parse_first_place(&body, |r| self.fetcher.photo_url(r))?
            .ok_or(ProviderError::NoResults)?;
        place.validate()?;

        debug!(place_id = %place.place_id, name = %place.name, "resolved place");
        Ok(place)
    }
}

/// Parse a place lookup body into places, in provider order.
///
/// `photo_url` turns a photo reference into a downloadable URL. Every
/// result must carry its required fields.
pub fn parse_places(
    body: &str,
    photo_url: impl Fn(&str) -> String,
) -> Result<Vec<PlaceInfo>, ProviderError> {
    place_results(body)?
        .iter()
        .map(|result| convert_place(result, &photo_url))
        .collect()
}

/// Parse only the best match from a place lookup body.
///
/// Later results are not converted, so a broken runner-up cannot fail the
/// lookup. `None` when the provider found nothing.
pub fn parse_first_place(
    body: &str,
    photo_url: impl Fn(&str) -> String,
) -> Result<Option<PlaceInfo>, ProviderError> {
    let results = place_results(body)?;
    if results.len() > 1 {
        debug!(ignored = results.len() - 1, "using first place result");
    }
    results
        .first()
        .map(|result| convert_place(result, &photo_url))
        .transpose()
}

/// The raw results of a successful lookup; empty for `ZERO_RESULTS`.
fn place_results(body: &str) -> Result<Vec<PlaceResult>, ProviderError> {
    let response: PlacesResponse = parse_json(body)?;

    match response.status.as_deref() {
        None | Some("OK") => {}
        Some("ZERO_RESULTS") => return Ok(Vec::new()),
        Some(other) => {
            return Err(ProviderError::Refused {
                status: other.to_string(),
                message: response.error_message.unwrap_or_default(),
            });
        }
    }

    Ok(if response.candidates.is_empty() {
        response.results
    } else {
        response.candidates
    })
}

/// Convert one result. `place_id` and the location are required.
pub fn convert_place(
    result: &PlaceResult,
    photo_url: &impl Fn(&str) -> String,
) -> Result<PlaceInfo, ProviderError> {
    let place_id = result
        .place_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or(ProviderError::MissingField("place_id"))?;

    let lat_lng = result
        .geometry
        .as_ref()
        .and_then(|g| g.location)
        .ok_or(ProviderError::MissingField("geometry.location"))?;

    let location = Location {
        address: result.formatted_address.clone().unwrap_or_default(),
        plus_code: result
            .plus_code
            .as_ref()
            .and_then(|p| p.global_code.clone())
            .unwrap_or_default(),
        coordinates: Coordinates::new(lat_lng.lat, lat_lng.lng)?,
    };

    let mut place = PlaceInfo::new(place_id, result.name.clone().unwrap_or_default(), location);
    place.types = result.types.iter().cloned().collect();
    place.ratings_total = result.user_ratings_total.unwrap_or(0);
    place.reviews = result.reviews.iter().filter_map(convert_review).collect();
    place.pictures = result
        .photos
        .iter()
        .filter_map(|photo| convert_photo(photo, photo_url))
        .collect();
    place.opening_hours = convert_opening_hours(result.opening_hours.as_ref());

    Ok(place)
}

fn convert_review(dto: &ReviewDto) -> Option<Review> {
    let rating = dto.rating.filter(|r| (0.0..=5.0).contains(r));
    let Some(rating) = rating else {
        warn!(author = ?dto.author_name, rating = ?dto.rating, "skipping review without valid rating");
        return None;
    };

    Some(Review {
        author_name: dto.author_name.clone().unwrap_or_default(),
        author_profile: dto.author_url.clone(),
        language: dto.language.clone().unwrap_or_default(),
        text: dto.text.clone().unwrap_or_default(),
        rating,
        published_at: dto.time.and_then(|t| DateTime::from_timestamp(t, 0)),
    })
}

fn convert_photo(dto: &PhotoDto, photo_url: &impl Fn(&str) -> String) -> Option<Picture> {
    let reference = dto.photo_reference.as_deref().filter(|r| !r.is_empty())?;
    let width = dto.width.and_then(|w| u32::try_from(w).ok()).filter(|w| *w > 0)?;
    let height = dto.height.and_then(|h| u32::try_from(h).ok()).filter(|h| *h > 0)?;

    Some(Picture {
        url: photo_url(reference),
        width,
        height,
    })
}

/// Day numbering used by the provider: 0 is Sunday.
fn weekday_from_provider(day: u8) -> Option<Weekday> {
    match day {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// `HHMM`, with `2400` read as end of day.
fn parse_hhmm(s: &str) -> Option<NaiveTime> {
    if s == "2400" {
        return NaiveTime::from_hms_opt(23, 59, 0);
    }
    NaiveTime::parse_from_str(s, "%H%M").ok()
}

/// Normalise provider periods into a full week.
///
/// Each day takes its first period. A lone period with no close time means
/// open around the clock. Days without a period are closed.
pub fn convert_opening_hours(dto: Option<&OpeningHoursDto>) -> OpeningHours {
    let Some(dto) = dto else {
        return OpeningHours::all_closed();
    };

    if let [only] = dto.periods.as_slice() {
        if only.close.is_none() {
            return OpeningHours::always_open();
        }
    }

    let mut hours = OpeningHours::all_closed();
    for period in &dto.periods {
        let Some(open) = &period.open else { continue };
        let Some(day) = open.day.and_then(weekday_from_provider) else {
            continue;
        };
        if !hours.get(day).is_closed() {
            continue;
        }
        let Some(opens) = open.time.as_deref().and_then(parse_hhmm) else {
            continue;
        };
        let closes = period
            .close
            .as_ref()
            .and_then(|c| c.time.as_deref())
            .and_then(parse_hhmm)
            .or_else(|| NaiveTime::from_hms_opt(23, 59, 0))
            .unwrap_or(opens);
        hours.set(day, DayHours::Open { opens, closes });
    }
    hours
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn photo_url(reference: &str) -> String {
        format!("https://photos.test/{reference}")
    }

    fn morrinhos() -> serde_json::Value {
        json!({
            "status": "OK",
            "results": [{
                "place_id": "ChIJN1t_tDeuEmsRUsoyG83frY4",
                "name": "Morrinhos",
                "formatted_address": "Morrinhos, GO, Brasil",
                "plus_code": {"global_code": "589R7VC2+2V"},
                "geometry": {"location": {"lat": -17.7311, "lng": -49.1058}},
                "types": ["locality", "political"],
                "user_ratings_total": 42,
                "opening_hours": {
                    "periods": [{
                        "open": {"day": 0, "time": "0800"},
                        "close": {"day": 0, "time": "0200"}
                    }]
                },
                "photos": [{
                    "photo_reference": "AWU5eFjiROQJEeMpt7Hh2Pv",
                    "width": 2268,
                    "height": 4032
                }],
                "reviews": [{
                    "author_name": "Maria",
                    "author_url": "https://www.google.com/maps/contrib/1",
                    "language": "pt",
                    "text": "Cidade acolhedora",
                    "rating": 5,
                    "time": 1691269200
                }]
            }]
        })
    }

    #[test]
    fn parses_full_place() {
        let places = parse_places(&morrinhos().to_string(), photo_url).unwrap();
        assert_eq!(places.len(), 1);
        let place = &places[0];

        assert_eq!(place.place_id, "ChIJN1t_tDeuEmsRUsoyG83frY4");
        assert_eq!(place.name, "Morrinhos");
        assert_eq!(place.location.address, "Morrinhos, GO, Brasil");
        assert_eq!(place.location.plus_code, "589R7VC2+2V");
        assert_eq!(place.location.coordinates.latitude(), -17.7311);
        assert_eq!(place.ratings_total, 42);
        assert!(place.types.contains("locality"));

        assert_eq!(place.pictures.len(), 1);
        assert_eq!(place.pictures[0].url, "https://photos.test/AWU5eFjiROQJEeMpt7Hh2Pv");
        assert_eq!(place.pictures[0].width, 2268);
        assert_eq!(place.pictures[0].height, 4032);

        assert_eq!(place.reviews.len(), 1);
        let review = &place.reviews[0];
        assert_eq!(review.author_name, "Maria");
        assert_eq!(review.language, "pt");
        assert_eq!(review.rating, 5.0);
        assert_eq!(
            review.published_at,
            DateTime::from_timestamp(1_691_269_200, 0)
        );
    }

    #[test]
    fn opening_hours_from_periods() {
        let places = parse_places(&morrinhos().to_string(), photo_url).unwrap();
        let hours = &places[0].opening_hours;

        assert_eq!(hours.get(Weekday::Sun).to_string(), "08:00-02:00");
        for day in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Sat] {
            assert_eq!(hours.get(day).to_string(), "Closed");
        }

        let serialized = serde_json::to_value(hours).unwrap();
        assert_eq!(serialized["Sunday"], "08:00-02:00");
        assert_eq!(serialized["Monday"], "Closed");
    }

    #[test]
    fn missing_optional_fields_default() {
        let body = json!({
            "status": "OK",
            "results": [{
                "place_id": "abc",
                "geometry": {"location": {"lat": 1.0, "lng": 2.0}}
            }]
        });
        let place = parse_places(&body.to_string(), photo_url).unwrap().remove(0);

        assert_eq!(place.name, "");
        assert!(place.reviews.is_empty());
        assert!(place.pictures.is_empty());
        assert_eq!(place.ratings_total, 0);
        assert!(place.opening_hours.iter().all(|(_, h)| h.is_closed()));
    }

    #[test]
    fn null_lists_default() {
        let body = json!({
            "status": "OK",
            "results": [{
                "place_id": "abc",
                "geometry": {"location": {"lat": 1.0, "lng": 2.0}},
                "types": null,
                "reviews": null,
                "photos": null,
                "opening_hours": {"periods": null}
            }],
            "candidates": null
        });
        let place = parse_places(&body.to_string(), photo_url).unwrap().remove(0);

        assert_eq!(place.place_id, "abc");
        assert!(place.types.is_empty());
        assert!(place.reviews.is_empty());
        assert!(place.pictures.is_empty());
        assert!(place.opening_hours.iter().all(|(_, h)| h.is_closed()));
    }

    #[test]
    fn missing_place_id_is_malformed() {
        let body = json!({
            "results": [{"name": "x", "geometry": {"location": {"lat": 1.0, "lng": 2.0}}}]
        });
        let err = parse_places(&body.to_string(), photo_url).unwrap_err();
        assert!(matches!(err, ProviderError::MissingField("place_id")));
    }

    #[test]
    fn missing_location_is_malformed() {
        let body = json!({"results": [{"place_id": "abc", "geometry": {}}]});
        let err = parse_places(&body.to_string(), photo_url).unwrap_err();
        assert!(matches!(err, ProviderError::MissingField("geometry.location")));
    }

    #[test]
    fn candidates_used_for_find_place() {
        let body = json!({
            "status": "OK",
            "candidates": [{"place_id": "c1", "geometry": {"location": {"lat": 1.0, "lng": 2.0}}}]
        });
        let places = parse_places(&body.to_string(), photo_url).unwrap();
        assert_eq!(places[0].place_id, "c1");
    }

    #[test]
    fn zero_results_is_empty() {
        let body = json!({"status": "ZERO_RESULTS", "results": []});
        assert!(parse_places(&body.to_string(), photo_url).unwrap().is_empty());
    }

    #[test]
    fn denied_request_is_refused() {
        let body = json!({"status": "REQUEST_DENIED", "error_message": "bad key"});
        let err = parse_places(&body.to_string(), photo_url).unwrap_err();
        assert!(err.is_unavailable());
        assert!(err.to_string().contains("bad key"));
    }

    #[test]
    fn invalid_photos_and_reviews_skipped() {
        let body = json!({
            "results": [{
                "place_id": "abc",
                "geometry": {"location": {"lat": 1.0, "lng": 2.0}},
                "photos": [
                    {"photo_reference": "", "width": 10, "height": 10},
                    {"photo_reference": "ok", "width": 0, "height": 10},
                    {"photo_reference": "good", "width": 10, "height": 20}
                ],
                "reviews": [{"author_name": "a", "rating": 9}, {"author_name": "b"}]
            }]
        });
        let place = parse_places(&body.to_string(), photo_url).unwrap().remove(0);
        assert_eq!(place.pictures.len(), 1);
        assert_eq!(place.pictures[0].url, "https://photos.test/good");
        assert!(place.reviews.is_empty());
    }

    #[test]
    fn single_open_period_is_always_open() {
        let dto: OpeningHoursDto =
            serde_json::from_value(json!({"periods": [{"open": {"day": 0, "time": "0000"}}]}))
                .unwrap();
        let hours = convert_opening_hours(Some(&dto));
        for (_, day) in hours.iter() {
            assert_eq!(day.to_string(), "00:00-23:59");
        }
    }

    #[test]
    fn first_period_per_day_wins() {
        let dto: OpeningHoursDto = serde_json::from_value(json!({"periods": [
            {"open": {"day": 1, "time": "0800"}, "close": {"day": 1, "time": "1200"}},
            {"open": {"day": 1, "time": "1400"}, "close": {"day": 1, "time": "1800"}},
            {"open": {"day": 6, "time": "1000"}, "close": {"day": 6, "time": "2400"}}
        ]}))
        .unwrap();
        let hours = convert_opening_hours(Some(&dto));
        assert_eq!(hours.get(Weekday::Mon).to_string(), "08:00-12:00");
        assert_eq!(hours.get(Weekday::Sat).to_string(), "10:00-23:59");
        assert!(hours.get(Weekday::Sun).is_closed());
    }

    #[test]
    fn absent_opening_hours_all_closed() {
        let hours = convert_opening_hours(None);
        assert!(hours.iter().all(|(_, h)| h.is_closed()));
    }

    struct CannedFetcher(String);

    impl PlaceFetcher for CannedFetcher {
        async fn fetch_place(&self, _query: &PlaceQuery) -> Result<String, ProviderError> {
            Ok(self.0.clone())
        }

        fn photo_url(&self, reference: &str) -> String {
            photo_url(reference)
        }
    }

    fn query() -> PlaceQuery {
        crate::query::resolve_query(
            json!({"text_input": "Morrinhos", "inputtype": "textquery"})
                .as_object()
                .unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn resolver_returns_first_place() {
        let resolver = PlaceResolver::new(CannedFetcher(morrinhos().to_string()));
        let place = resolver.resolve(&query()).await.unwrap();
        assert_eq!(place.name, "Morrinhos");
    }

    #[test]
    fn broken_runner_up_ignored() {
        let body = json!({
            "status": "OK",
            "results": [
                {"place_id": "good", "name": "Morrinhos", "geometry": {"location": {"lat": -17.7, "lng": -49.1}}},
                {"name": "broken"}
            ]
        })
        .to_string();

        let place = parse_first_place(&body, photo_url).unwrap().unwrap();
        assert_eq!(place.place_id, "good");
        assert!(matches!(
            parse_places(&body, photo_url),
            Err(ProviderError::MissingField("place_id"))
        ));
    }

    #[test]
    fn broken_first_result_is_malformed() {
        let body = json!({
            "results": [
                {"name": "broken"},
                {"place_id": "good", "geometry": {"location": {"lat": 1.0, "lng": 2.0}}}
            ]
        });
        let err = parse_first_place(&body.to_string(), photo_url).unwrap_err();
        assert!(matches!(err, ProviderError::MissingField("place_id")));
    }

    #[tokio::test]
    async fn resolver_skips_broken_runner_up() {
        let mut body = morrinhos();
        body["results"]
            .as_array_mut()
            .unwrap()
            .push(json!({"name": "no id", "geometry": {}}));

        let resolver = PlaceResolver::new(CannedFetcher(body.to_string()));
        let place = resolver.resolve(&query()).await.unwrap();
        assert_eq!(place.name, "Morrinhos");
    }

    #[tokio::test]
    async fn resolver_reports_no_results() {
        let resolver = PlaceResolver::new(CannedFetcher(
            json!({"status": "ZERO_RESULTS"}).to_string(),
        ));
        let err = resolver.resolve(&query()).await.unwrap_err();
        assert!(matches!(err, ProviderError::NoResults));
    }
}
