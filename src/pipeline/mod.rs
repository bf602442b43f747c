//! The spot pipeline: feed fetch → place enrichment → filter and dedupe.
pub mod aggregate;
pub mod cycle;
pub mod enrich;
pub mod error;
pub mod feed;

#[cfg(test)]
pub(crate) mod fakes;

pub use aggregate::{DedupedPlace, VibeFilter, aggregate};
pub use cycle::{CycleGuard, CycleToken};
pub use enrich::enrich_photos;
pub use error::FeedError;
pub use feed::fetch_feed;
