//! Place types.
//!
//! A `PlaceInfo` is the resolved form of a place query: identity,
//! location, and the optional display data (reviews, pictures, opening
//! hours) a provider may or may not return.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{Coordinates, DomainError};

/// Where a place is.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Location {
    /// Street address (empty when the provider omits it)
    pub address: String,
    /// Plus code (empty when the provider omits it)
    pub plus_code: String,
    pub coordinates: Coordinates,
}

impl Location {
    /// A location known only by its coordinates.
    pub fn at(coordinates: Coordinates) -> Self {
        Self {
            address: String::new(),
            plus_code: String::new(),
            coordinates,
        }
    }
}

/// A user review of a place.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Review {
    pub author_name: String,
    pub author_profile: Option<String>,
    pub language: String,
    pub text: String,
    /// Rating between 0.0 and 5.0
    pub rating: f64,
    pub published_at: Option<DateTime<Utc>>,
}

/// A photo of a place.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Picture {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Opening interval for one day, or closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayHours {
    Open { opens: NaiveTime, closes: NaiveTime },
    Closed,
}

impl DayHours {
    /// Open around the clock.
    pub fn all_day() -> Self {
        DayHours::Open {
            opens: NaiveTime::MIN,
            closes: NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN),
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, DayHours::Closed)
    }
}

impl fmt::Display for DayHours {
    /// `HH:MM-HH:MM` or `Closed`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayHours::Open { opens, closes } => {
                write!(f, "{}-{}", opens.format("%H:%M"), closes.format("%H:%M"))
            }
            DayHours::Closed => f.write_str("Closed"),
        }
    }
}

/// Weekly opening hours.
///
/// Every weekday always has an entry, so lookups never fail. Serializes
/// as a map from weekday name (`"Monday"` .. `"Sunday"`) to the
/// `DayHours` display string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningHours {
    /// Indexed by `Weekday::num_days_from_monday`.
    days: [DayHours; 7],
}

impl OpeningHours {
    /// Closed every day.
    pub fn all_closed() -> Self {
        Self {
            days: [DayHours::Closed; 7],
        }
    }

    /// Open around the clock every day.
    pub fn always_open() -> Self {
        Self {
            days: [DayHours::all_day(); 7],
        }
    }

    pub fn get(&self, day: Weekday) -> DayHours {
        self.days[day.num_days_from_monday() as usize]
    }

    pub fn set(&mut self, day: Weekday, hours: DayHours) {
        self.days[day.num_days_from_monday() as usize] = hours;
    }

    /// Iterate Monday to Sunday.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, DayHours)> + '_ {
        WEEK.iter().map(|&day| (day, self.get(day)))
    }
}

impl Default for OpeningHours {
    fn default() -> Self {
        Self::all_closed()
    }
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English weekday name.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

impl Serialize for OpeningHours {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(7))?;
        for (day, hours) in self.iter() {
            map.serialize_entry(weekday_name(day), &hours.to_string())?;
        }
        map.end()
    }
}

/// A resolved place.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PlaceInfo {
    pub place_id: String,
    pub name: String,
    pub location: Location,
    pub types: BTreeSet<String>,
    pub reviews: Vec<Review>,
    pub pictures: Vec<Picture>,
    pub ratings_total: u32,
    pub opening_hours: OpeningHours,
}

impl PlaceInfo {
    /// A place with identity and location only; display data empty.
    pub fn new(place_id: impl Into<String>, name: impl Into<String>, location: Location) -> Self {
        Self {
            place_id: place_id.into(),
            name: name.into(),
            location,
            types: BTreeSet::new(),
            reviews: Vec::new(),
            pictures: Vec::new(),
            ratings_total: 0,
            opening_hours: OpeningHours::all_closed(),
        }
    }

    /// Check entity invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if the place ID is blank, a review rating is
    /// outside [0, 5], or a picture has a zero dimension.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.place_id.trim().is_empty() {
            return Err(DomainError::EmptyField("place_id"));
        }
        for review in &self.reviews {
            if !(0.0..=5.0).contains(&review.rating) {
                return Err(DomainError::OutOfRange {
                    field: "review rating",
                    value: review.rating,
                });
            }
        }
        for picture in &self.pictures {
            if picture.width == 0 || picture.height == 0 {
                return Err(DomainError::NotPositive {
                    field: "picture dimension",
                    value: 0.0,
                });
            }
        }
        Ok(())
    }
}
