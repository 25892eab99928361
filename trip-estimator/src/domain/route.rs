//! Route and transportation types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Coordinates, DomainError};

/// How the traveller moves between the two places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportationMode {
    Car,
    Bike,
    Bus,
    Train,
    Walk,
}

impl TransportationMode {
    pub const ALL: [TransportationMode; 5] = [
        TransportationMode::Car,
        TransportationMode::Bike,
        TransportationMode::Bus,
        TransportationMode::Train,
        TransportationMode::Walk,
    ];

    /// The routing provider's travel-mode vocabulary.
    pub fn travel_mode(self) -> &'static str {
        match self {
            TransportationMode::Car => "DRIVE",
            TransportationMode::Bike => "BICYCLE",
            TransportationMode::Bus | TransportationMode::Train => "TRANSIT",
            TransportationMode::Walk => "WALK",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransportationMode::Car => "car",
            TransportationMode::Bike => "bike",
            TransportationMode::Bus => "bus",
            TransportationMode::Train => "train",
            TransportationMode::Walk => "walk",
        }
    }
}

impl fmt::Display for TransportationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown transportation mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transportation mode: {0}")]
pub struct UnknownTransportationMode(pub String);

impl FromStr for TransportationMode {
    type Err = UnknownTransportationMode;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == wanted)
            .ok_or_else(|| UnknownTransportationMode(s.to_string()))
    }
}

/// Transportation details attached to a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transportation {
    pub mode: TransportationMode,
    /// Transit fare, when the provider reports one
    pub fare: Option<f64>,
    pub provider: Option<String>,
    pub details: Option<String>,
}

impl Transportation {
    pub fn new(mode: TransportationMode) -> Self {
        Self {
            mode,
            fare: None,
            provider: None,
            details: None,
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        if let Some(fare) = self.fare.filter(|f| f.is_nan() || *f < 0.0) {
            return Err(DomainError::Negative {
                field: "fare",
                value: fare,
            });
        }
        if self.provider.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(DomainError::EmptyField("provider"));
        }
        Ok(())
    }
}

/// A computed route between two points.
///
/// # Invariants
///
/// - Origin and destination differ
/// - Polyline is non-empty
/// - Duration (minutes) and distance (meters) are strictly positive
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    origin: Coordinates,
    destination: Coordinates,
    polyline: String,
    duration: f64,
    distance: f64,
    transportation: Transportation,
}

impl Route {
    /// Construct a route, enforcing its invariants.
    ///
    /// `duration` is in minutes, `distance` in meters.
    pub fn new(
        origin: Coordinates,
        destination: Coordinates,
        polyline: impl Into<String>,
        duration: f64,
        distance: f64,
        transportation: Transportation,
    ) -> Result<Self, DomainError> {
        if origin == destination {
            return Err(DomainError::SameEndpoints);
        }
        let polyline = polyline.into();
        if polyline.is_empty() {
            return Err(DomainError::EmptyField("polyline"));
        }
        if !(duration > 0.0) {
            return Err(DomainError::NotPositive {
                field: "duration",
                value: duration,
            });
        }
        if !(distance > 0.0) {
            return Err(DomainError::NotPositive {
                field: "distance",
                value: distance,
            });
        }
        transportation.validate()?;

        Ok(Self {
            origin,
            destination,
            polyline,
            duration,
            distance,
            transportation,
        })
    }

    pub fn origin(&self) -> &Coordinates {
        &self.origin
    }

    pub fn destination(&self) -> &Coordinates {
        &self.destination
    }

    pub fn polyline(&self) -> &str {
        &self.polyline
    }

    /// Duration in minutes.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Distance in meters.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn transportation(&self) -> &Transportation {
        &self.transportation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lng: f64) -> Coordinates {
        Coordinates::new(lat, lng).unwrap()
    }

    fn route(duration: f64, distance: f64) -> Result<Route, DomainError> {
        Route::new(
            point(40.7128, -74.0060),
            point(34.0522, -118.2437),
            "fhuoFbkajWnFwBuA`GsDeB",
            duration,
            distance,
            Transportation::new(TransportationMode::Car),
        )
    }

    #[test]
    fn valid_route() {
        let r = route(216.0, 3_935_745.0).unwrap();
        assert_eq!(r.duration(), 216.0);
        assert_eq!(r.distance(), 3_935_745.0);
        assert_eq!(r.transportation().mode, TransportationMode::Car);
    }

    #[test]
    fn rejects_same_endpoints() {
        let p = point(1.0, 2.0);
        let err = Route::new(p, p, "abc", 1.0, 1.0, Transportation::new(TransportationMode::Walk));
        assert_eq!(err, Err(DomainError::SameEndpoints));
    }

    #[test]
    fn rejects_non_positive_duration_and_distance() {
        assert!(matches!(
            route(0.0, 10.0),
            Err(DomainError::NotPositive { field: "duration", .. })
        ));
        assert!(matches!(
            route(-1.0, 10.0),
            Err(DomainError::NotPositive { field: "duration", .. })
        ));
        assert!(matches!(
            route(10.0, 0.0),
            Err(DomainError::NotPositive { field: "distance", .. })
        ));
        assert!(route(f64::NAN, 10.0).is_err());
    }

    #[test]
    fn rejects_empty_polyline() {
        let err = Route::new(
            point(1.0, 2.0),
            point(3.0, 4.0),
            "",
            1.0,
            1.0,
            Transportation::new(TransportationMode::Car),
        );
        assert_eq!(err, Err(DomainError::EmptyField("polyline")));
    }

    #[test]
    fn rejects_negative_fare_and_blank_provider() {
        let mut t = Transportation::new(TransportationMode::Bus);
        t.fare = Some(-0.5);
        assert!(t.validate().is_err());

        let mut t = Transportation::new(TransportationMode::Bus);
        t.provider = Some("  ".into());
        assert_eq!(t.validate(), Err(DomainError::EmptyField("provider")));

        let mut t = Transportation::new(TransportationMode::Bus);
        t.fare = Some(0.0);
        t.provider = Some("Metro".into());
        assert!(t.validate().is_ok());
    }

    #[test]
    fn travel_modes() {
        assert_eq!(TransportationMode::Car.travel_mode(), "DRIVE");
        assert_eq!(TransportationMode::Bike.travel_mode(), "BICYCLE");
        assert_eq!(TransportationMode::Bus.travel_mode(), "TRANSIT");
        assert_eq!(TransportationMode::Train.travel_mode(), "TRANSIT");
        assert_eq!(TransportationMode::Walk.travel_mode(), "WALK");
    }

    #[test]
    fn parse_mode() {
        assert_eq!(" CAR ".parse(), Ok(TransportationMode::Car));
        assert_eq!("train".parse(), Ok(TransportationMode::Train));
        assert!("plane".parse::<TransportationMode>().is_err());
        for mode in TransportationMode::ALL {
            assert_eq!(mode.to_string().parse(), Ok(mode));
        }
    }

    #[test]
    fn mode_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&TransportationMode::Bike).unwrap(),
            "\"bike\""
        );
        let mode: TransportationMode = serde_json::from_str("\"walk\"").unwrap();
        assert_eq!(mode, TransportationMode::Walk);
    }
}
