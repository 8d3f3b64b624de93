//! Coordinates and the origin of a locate request.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A validated latitude/longitude pair in degrees.
///
/// Serializes as the engine's geo-point object form, `{"lat": .., "lon": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(rename = "lat")]
    latitude: f64,
    #[serde(rename = "lon")]
    longitude: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] when either component is NaN,
    /// infinite, or outside `[-90, 90]` / `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        let reject = |reason| CoreError::InvalidCoordinate {
            latitude,
            longitude,
            reason,
        };
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(reject("components must be finite"));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(reject("latitude must be within [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(reject("longitude must be within [-180, 180]"));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Re-checks the range invariant. Deserialization bypasses [`Coordinate::new`].
    ///
    /// # Errors
    ///
    /// Same as [`Coordinate::new`].
    pub fn validate(&self) -> Result<(), CoreError> {
        Self::new(self.latitude, self.longitude).map(|_| ())
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Where a locate request starts: exactly one of a free-text location or an
/// explicit coordinate.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    /// Free-text address or zip code, resolved through the geocoder.
    ByLocation(String),
    ByCoordinate(Coordinate),
}

impl LocationQuery {
    /// Maps the loose caller shape (optional string, optional lat/lon) onto
    /// the tagged union.
    ///
    /// # Errors
    ///
    /// - [`CoreError::AmbiguousOrigin`] when neither or both origins are given,
    ///   or only one half of the coordinate is present.
    /// - [`CoreError::EmptyLocation`] for a blank location string.
    /// - [`CoreError::InvalidCoordinate`] for an out-of-range coordinate.
    pub fn from_parts(
        location: Option<&str>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Self, CoreError> {
        match (location, latitude, longitude) {
            (Some(loc), None, None) => {
                let trimmed = loc.trim();
                if trimmed.is_empty() {
                    return Err(CoreError::EmptyLocation);
                }
                Ok(Self::ByLocation(trimmed.to_string()))
            }
            (None, Some(lat), Some(lon)) => Ok(Self::ByCoordinate(Coordinate::new(lat, lon)?)),
            _ => Err(CoreError::AmbiguousOrigin),
        }
    }
}
