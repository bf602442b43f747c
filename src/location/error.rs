use crate::backend::BackendError;
use crate::types::CoordinateError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A failed search. The caller's reference coordinate stays as it was.
#[derive(Error, Debug)]
pub enum LocationError {
    #[error("No location found for \"{query}\"")]
    NotFound { query: String },

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),

    #[error("Geocoding service failed: {0}")]
    Geocoder(#[source] BackendError),
}

/// What the platform geolocation provider reported instead of a position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("Location access denied")]
    PermissionDenied,

    #[error("Geolocation not supported")]
    Unsupported,

    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),
}

/// Why the resolver fell back to the default coordinate. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationUnavailable {
    Denied,
    Unsupported,
    TimedOut(Duration),
    Failed(String),
}

impl From<GeolocationError> for LocationUnavailable {
    fn from(error: GeolocationError) -> Self {
        match error {
            GeolocationError::PermissionDenied => LocationUnavailable::Denied,
            GeolocationError::Unsupported => LocationUnavailable::Unsupported,
            GeolocationError::PositionUnavailable(reason) => LocationUnavailable::Failed(reason),
        }
    }
}

impl fmt::Display for LocationUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationUnavailable::Denied => f.write_str("Location access denied"),
            LocationUnavailable::Unsupported => f.write_str("Geolocation not supported"),
            LocationUnavailable::TimedOut(after) => {
                write!(f, "Location request timed out after {}s", after.as_secs())
            }
            LocationUnavailable::Failed(reason) => write!(f, "Location unavailable: {reason}"),
        }
    }
}
