//! Remote collaborators and the HTTP client that talks to them.
//!
//! The pipeline only sees the [`PhotoFeed`] and [`PlaceDetailsSource`] traits, so the
//! reqwest-backed [`BackendClient`] can be swapped for an in-memory source.
pub mod error;
pub mod http;
pub mod wire;

pub use error::BackendError;
pub use http::BackendClient;

use crate::backend::wire::{
    AreaQuery, NearbyPhoto, PlaceDetails, PlaceDetailsRequest, RefreshSummary,
};
use async_trait::async_trait;

/// The remote geotagged-image index.
#[async_trait]
pub trait PhotoFeed: Send + Sync {
    /// Asks the index to ingest fresh images for the area.
    async fn refresh_area(&self, query: &AreaQuery) -> Result<RefreshSummary, BackendError>;

    /// Lists every indexed photo inside the area.
    async fn photos_nearby(&self, query: &AreaQuery) -> Result<Vec<NearbyPhoto>, BackendError>;
}

/// Looks up descriptive metadata for a single photo.
#[async_trait]
pub trait PlaceDetailsSource: Send + Sync {
    async fn place_details(
        &self,
        request: &PlaceDetailsRequest,
    ) -> Result<PlaceDetails, BackendError>;
}
