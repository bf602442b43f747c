use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinateError {
    #[error("Coordinate is not a finite number: ({lat}, {lng})")]
    NonFinite { lat: f64, lng: f64 },

    #[error("Coordinate out of range: ({lat}, {lng})")]
    OutOfRange { lat: f64, lng: f64 },
}

/// A WGS84 point. Every query in the pipeline is driven by one of these.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Downtown Toronto, used whenever the device position can't be determined.
    pub const FALLBACK: Coordinate = Coordinate {
        lat: 43.6532,
        lng: -79.3832,
    };

    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        let coordinate = Self { lat, lng };
        coordinate.validate()?;
        Ok(coordinate)
    }

    pub fn validate(&self) -> Result<(), CoordinateError> {
        let (lat, lng) = (self.lat, self.lng);
        if !lat.is_finite() || !lng.is_finite() {
            return Err(CoordinateError::NonFinite { lat, lng });
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateError::OutOfRange { lat, lng });
        }
        Ok(())
    }

    /// Great-circle distance using the haversine formula.
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + (d_lng / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lng)
    }
}
