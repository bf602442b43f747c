use crate::backend::PhotoFeed;
use crate::backend::wire::AreaQuery;
use crate::pipeline::cycle::CycleToken;
use crate::pipeline::error::FeedError;
use crate::types::RawPhoto;
use tracing::{debug, warn};

/// Refreshes the remote index for the area, then lists the photos inside it.
///
/// The query is only issued once the refresh has finished, so it observes the refresh's
/// effects. A failure in either step aborts the whole fetch. Records that come back
/// without usable coordinates are skipped; the rest keep the backend's order.
pub async fn fetch_feed(
    feed: &dyn PhotoFeed,
    query: &AreaQuery,
    cycle: CycleToken,
) -> Result<Vec<RawPhoto>, FeedError> {
    let summary = feed.refresh_area(query).await.map_err(FeedError::Refresh)?;
    debug!(cycle = cycle.value(), new_photos = summary.count, "Refresh finished");

    let records = feed.photos_nearby(query).await.map_err(FeedError::Query)?;
    let total = records.len();

    let photos: Vec<RawPhoto> = records
        .into_iter()
        .enumerate()
        .filter_map(|(position, record)| RawPhoto::from_nearby(record, cycle, position))
        .collect();

    if photos.len() < total {
        warn!(
            cycle = cycle.value(),
            skipped = total - photos.len(),
            "Skipped feed records without valid coordinates"
        );
    }
    debug!(cycle = cycle.value(), photos = photos.len(), "Feed fetched");
    Ok(photos)
}
