use crate::backend::BackendError;
use crate::types::CoordinateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("Image URL is required")]
    MissingImageUrl,

    #[error("Unsupported image URL: {0}")]
    UnsupportedImageUrl(String),

    #[error("Moodboard name is required")]
    MissingName,

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),

    #[error("Sun position could not be computed for ({lat}, {lng})")]
    SunCalculation { lat: f64, lng: f64 },

    #[error(transparent)]
    Backend(#[from] BackendError),
}
