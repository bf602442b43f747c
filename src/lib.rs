//! # SnapSphere
//!
//! Discover photogenic spots around a location.
//!
//! This crate is the client side of the SnapSphere photo-spot service. It resolves a
//! reference location, asks the backend for the geotagged photos around it, enriches
//! every photo with place details and turns the result into a filterable,
//! deduplicated list of places ready to be drawn on a map.
//!
//! ## Key Features
//!
//! - **Location**: Device position with a timeout and fallback, free-text search through Nominatim, map clicks, offline place names.
//! - **Spot Pipeline**: Refresh-then-query feed fetch, concurrent place enrichment that never drops a photo, and per-place deduplication.
//! - **Vibe Filters**: Narrow places down to those carrying every selected vibe.
//! - **Stale Result Protection**: Overlapping lookups never show results from an older location.
//! - **AI Features**: Vibe classification, captions, smart recommendations, spot submission and moodboards.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use snapsphere::location::{LocationResolver, NoGeolocation, NominatimGeocoder};
//! use snapsphere::{BackendClient, SnapSphereConfig, SpotExplorer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = SnapSphereConfig::load(None)?;
//!     let client = Arc::new(BackendClient::new(&config.backend)?);
//!     let geocoder = NominatimGeocoder::new(&config.geocoder, &config.backend.user_agent)?;
//!     let resolver =
//!         LocationResolver::from_config(&config.location, Arc::new(NoGeolocation), Arc::new(geocoder));
//!     let explorer = SpotExplorer::from_config(&config, client.clone(), client);
//!
//!     let resolution = resolver.search("High Park, Toronto").await?;
//!     explorer.apply_resolution(&resolution).await?;
//!     explorer.toggle_vibe("nature");
//!
//!     for place in explorer.places() {
//!         let photo = &place.photo;
//!         println!("{} ({:.1}): {}", photo.place_name, photo.rating, photo.vibes.join(", "));
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
mod error;
pub mod explorer;
pub mod features;
pub mod location;
pub mod map;
pub mod pipeline;
pub mod session;
pub mod types;

pub use backend::{BackendClient, BackendError};
pub use config::SnapSphereConfig;
pub use error::SnapSphereError;
pub use explorer::{CycleOutcome, ExplorerSnapshot, SpotExplorer, Status, StatusKind};
pub use location::{LocationResolver, Resolution};
pub use pipeline::{DedupedPlace, VibeFilter};
pub use session::Session;
