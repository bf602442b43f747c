use crate::backend::PlaceDetailsSource;
use crate::backend::wire::PlaceDetailsRequest;
use crate::types::{EnrichedPhoto, RawPhoto};
use futures::StreamExt;
use futures::stream;
use tracing::{debug, warn};

/// Joins every photo with its place details.
///
/// Lookups run concurrently, at most `concurrency` at a time, and the whole batch is
/// awaited before returning. The output has the same length and order as the input:
/// a failed lookup yields a defaulted record instead of dropping the photo.
pub async fn enrich_photos(
    source: &dyn PlaceDetailsSource,
    photos: Vec<RawPhoto>,
    concurrency: usize,
) -> Vec<EnrichedPhoto> {
    let total = photos.len();
    let enriched: Vec<EnrichedPhoto> = stream::iter(photos)
        .map(move |raw| enrich_one(source, raw))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let defaulted = enriched.iter().filter(|p| p.is_defaulted()).count();
    debug!(total, defaulted, "Enrichment batch finished");
    enriched
}

async fn enrich_one(source: &dyn PlaceDetailsSource, raw: RawPhoto) -> EnrichedPhoto {
    let request = PlaceDetailsRequest {
        latitude: raw.latitude,
        longitude: raw.longitude,
        photo_url: raw.photo_url.clone(),
    };

    match source.place_details(&request).await {
        Ok(details) => EnrichedPhoto::from_details(raw, details),
        Err(error) => {
            warn!(
                photo = %raw.id,
                url = %raw.photo_url,
                %error,
                "Place details lookup failed, using defaults"
            );
            EnrichedPhoto::defaulted(raw, error.to_string())
        }
    }
}
