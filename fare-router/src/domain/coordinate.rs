//! Geographic coordinate type.

use std::fmt;

use geo::{HaversineDistance, Point};

/// Error returned when constructing an invalid coordinate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate: {reason}")]
pub struct InvalidCoordinate {
    reason: &'static str,
}

/// A WGS84 latitude/longitude pair in decimal degrees.
///
/// Latitude is always within [-90, 90] and longitude within [-180, 180].
/// Any `Coordinate` value is valid by construction.
///
/// # Examples
///
/// ```
/// use fare_router::domain::Coordinate;
///
/// let tartu = Coordinate::new(58.4, 26.7).unwrap();
/// assert_eq!(tartu.lat(), 58.4);
///
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// assert!(Coordinate::new(0.0, f64::NAN).is_err());
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Create a coordinate, validating both components.
    pub fn new(lat: f64, lon: f64) -> Result<Self, InvalidCoordinate> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(InvalidCoordinate {
                reason: "components must be finite",
            });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidCoordinate {
                reason: "latitude must be within -90..=90",
            });
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(InvalidCoordinate {
                reason: "longitude must be within -180..=180",
            });
        }
        Ok(Self { lat, lon })
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Great-circle distance to `other` in kilometres.
    ///
    /// # Examples
    ///
    /// ```
    /// use fare_router::domain::Coordinate;
    ///
    /// let a = Coordinate::new(0.0, 0.0).unwrap();
    /// let b = Coordinate::new(1.0, 0.0).unwrap();
    /// let km = a.distance_km(&b);
    /// assert!((km - 111.2).abs() < 0.5);
    /// ```
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        self.to_point().haversine_distance(&other.to_point()) / 1000.0
    }

    /// Exact bit pattern of both components, usable as a hash key.
    pub(crate) fn bits(&self) -> (u64, u64) {
        // -0.0 and 0.0 are the same position
        ((self.lat + 0.0).to_bits(), (self.lon + 0.0).to_bits())
    }

    fn to_point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinate({}, {})", self.lat, self.lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}
