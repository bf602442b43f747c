//! Core value types shared by the pipeline, the location resolver and the features.
pub mod coordinate;
pub mod photo;

pub use coordinate::{Coordinate, CoordinateError};
pub use photo::{CrowdLevel, EnrichedPhoto, EnrichmentStatus, PhotoId, RawPhoto};
