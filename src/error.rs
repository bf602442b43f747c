use thiserror::Error;

/// The primary error type for the snapsphere crate.
#[derive(Error, Debug)]
pub enum SnapSphereError {
    #[error("Backend request failed: {0}")]
    Backend(#[from] crate::backend::BackendError),

    // --- Pipeline Errors ---
    #[error("Failed to fetch nearby photos: {0}")]
    FeedFetch(#[from] crate::pipeline::FeedError),

    #[error("Location lookup failed: {0}")]
    Location(#[from] crate::location::LocationError),

    #[error("{0}")]
    InvalidCoordinate(#[from] crate::types::CoordinateError),

    // --- Setup Errors ---
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("{0}")]
    Feature(#[from] crate::features::FeatureError),

    // --- Specific Logic Errors ---
    #[error("No reference location has been set yet")]
    NoReference,
}
