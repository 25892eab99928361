//! Geographic coordinate types.

use std::fmt;

use serde::Serialize;

use super::DomainError;

/// A validated WGS84 coordinate pair.
///
/// Latitude is always within [-90, 90] and longitude within [-180, 180].
///
/// # Examples
///
/// ```
/// use trip_estimator::domain::Coordinates;
///
/// let nyc = Coordinates::new(40.7128, -74.0060).unwrap();
/// assert_eq!(nyc.latitude(), 40.7128);
///
/// assert!(Coordinates::new(91.0, 0.0).is_err());
/// assert!(Coordinates::new(0.0, -180.5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Create a coordinate pair, rejecting out-of-range or non-finite values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::OutOfRange {
                field: "latitude",
                value: latitude,
            });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::OutOfRange {
                field: "longitude",
                value: longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// An axis-aligned box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Box extending `delta` degrees in every direction from `center`.
    pub fn around(center: &Coordinates, delta: f64) -> Self {
        Self {
            min_lon: center.longitude - delta,
            min_lat: center.latitude - delta,
            max_lon: center.longitude + delta,
            max_lat: center.latitude + delta,
        }
    }

    /// Box around the middle point of a path, or `None` for an empty path.
    pub fn around_midpoint(path: &[Coordinates], delta: f64) -> Option<Self> {
        path.get(path.len() / 2)
            .map(|middle| Self::around(middle, delta))
    }
}

impl fmt::Display for BoundingBox {
    /// Formats as `min_lon,min_lat,max_lon,max_lat`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_inclusive() {
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(
            Coordinates::new(-90.1, 0.0),
            Err(DomainError::OutOfRange {
                field: "latitude",
                value: -90.1
            })
        );
        assert!(Coordinates::new(0.0, 180.1).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn display_is_lat_comma_lng() {
        let c = Coordinates::new(-16.5, -49.25).unwrap();
        assert_eq!(c.to_string(), "-16.5,-49.25");
    }

    #[test]
    fn box_around_midpoint() {
        let path = vec![
            Coordinates::new(0.0, 0.0).unwrap(),
            Coordinates::new(10.0, 20.0).unwrap(),
            Coordinates::new(30.0, 40.0).unwrap(),
        ];
        let bbox = BoundingBox::around_midpoint(&path, 0.01).unwrap();
        assert!((bbox.min_lat - 9.99).abs() < 1e-9);
        assert!((bbox.max_lat - 10.01).abs() < 1e-9);
        assert!((bbox.min_lon - 19.99).abs() < 1e-9);
        assert!((bbox.max_lon - 20.01).abs() < 1e-9);
    }

    #[test]
    fn box_for_empty_path() {
        assert!(BoundingBox::around_midpoint(&[], 0.01).is_none());
    }

    #[test]
    fn box_display_order() {
        let bbox = BoundingBox {
            min_lon: 1.0,
            min_lat: 2.0,
            max_lon: 3.0,
            max_lat: 4.0,
        };
        assert_eq!(bbox.to_string(), "1,2,3,4");
    }
}
