//! The stateful driver that runs pipeline cycles and holds what a front end displays.
use crate::backend::wire::AreaQuery;
use crate::backend::{PhotoFeed, PlaceDetailsSource};
use crate::config::SnapSphereConfig;
use crate::error::SnapSphereError;
use crate::location::{LocationSource, Resolution};
use crate::map::{self, MarkerDescriptor, Viewport};
use crate::pipeline::aggregate::{
    MAX_PLACES, TRENDING_LIMIT, aggregate_capped, position_of, trending,
};
use crate::pipeline::{CycleGuard, CycleToken, DedupedPlace, VibeFilter, enrich_photos, fetch_feed};
use crate::types::{Coordinate, EnrichedPhoto, PhotoId};
use bon::bon;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusKind {
    Loading,
    Success,
    Error,
}

/// The status indicator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

impl Status {
    pub fn loading(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Loading,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }
}

/// What happened to a cycle's results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Applied { photos: usize, places: usize },
    /// A newer cycle started before this one finished; its results were dropped.
    Superseded,
    /// The coordinate's results are already on display.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerSnapshot {
    pub reference: Option<Coordinate>,
    pub status: Option<Status>,
    /// Non-fatal location message, e.g. why the default location is shown.
    pub notice: Option<String>,
    pub viewport: Viewport,
    pub vibes: Vec<String>,
    pub photos: Vec<EnrichedPhoto>,
    pub places: Vec<DedupedPlace>,
    pub trending: Vec<DedupedPlace>,
    pub markers: Vec<MarkerDescriptor>,
    pub selected: Option<EnrichedPhoto>,
}

#[derive(Debug)]
struct ViewState {
    reference: Option<Coordinate>,
    /// The coordinate whose photos are in `photos`.
    loaded_for: Option<Coordinate>,
    photos: Vec<EnrichedPhoto>,
    vibes: VibeFilter,
    status: Option<Status>,
    notice: Option<String>,
    viewport: Viewport,
    selected: Option<PhotoId>,
}

/// Runs location → feed → enrichment cycles and keeps the latest result on display.
///
/// All methods take `&self`, so one explorer can be shared between tasks. Cycles may
/// overlap; only the most recently started one is allowed to publish its results.
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use snapsphere::{BackendClient, SnapSphereConfig, SpotExplorer, SnapSphereError};
/// # use snapsphere::types::Coordinate;
/// # #[tokio::main]
/// # async fn main() -> Result<(), SnapSphereError> {
/// let client = Arc::new(BackendClient::new(&SnapSphereConfig::default().backend)?);
/// let explorer = SpotExplorer::builder()
///     .feed(client.clone())
///     .details(client)
///     .radius_km(2.0)
///     .build();
///
/// explorer.set_reference(Coordinate::new(43.6426, -79.3871)?).await?;
/// for place in explorer.places() {
///     println!("{} ({:.1})", place.photo.place_name, place.photo.rating);
/// }
/// # Ok(())
/// # }
/// ```
pub struct SpotExplorer {
    feed: Arc<dyn PhotoFeed>,
    details: Arc<dyn PlaceDetailsSource>,
    radius_km: f64,
    max_places: usize,
    lookup_concurrency: usize,
    focus_zoom: u8,
    guard: CycleGuard,
    state: Mutex<ViewState>,
}

#[bon]
impl SpotExplorer {
    /// # Builder Arguments
    ///
    /// * `feed` / `details` - The remote photo index and place details lookup. Usually the
    ///   same [`crate::BackendClient`].
    /// * `radius_km` - (Default: `2.0`) Search radius around the reference coordinate.
    /// * `max_places` - (Default: `50`) Cap on the number of distinct places shown.
    /// * `lookup_concurrency` - (Default: `16`) Place details lookups in flight at once.
    /// * `initial_center` / `initial_zoom` - Viewport before any location is known.
    /// * `focus_zoom` - (Default: `15`) Zoom used when recentering on a resolved location.
    #[builder]
    pub fn new(
        feed: Arc<dyn PhotoFeed>,
        details: Arc<dyn PlaceDetailsSource>,
        #[builder(default = 2.0)] radius_km: f64,
        #[builder(default = MAX_PLACES)] max_places: usize,
        #[builder(default = 16)] lookup_concurrency: usize,
        #[builder(default = Coordinate::FALLBACK)] initial_center: Coordinate,
        #[builder(default = 13)] initial_zoom: u8,
        #[builder(default = 15)] focus_zoom: u8,
    ) -> Self {
        Self {
            feed,
            details,
            radius_km,
            max_places,
            lookup_concurrency: lookup_concurrency.max(1),
            focus_zoom,
            guard: CycleGuard::new(),
            state: Mutex::new(ViewState {
                reference: None,
                loaded_for: None,
                photos: Vec::new(),
                vibes: VibeFilter::new(),
                status: None,
                notice: None,
                viewport: Viewport {
                    center: initial_center,
                    zoom: initial_zoom,
                },
                selected: None,
            }),
        }
    }

    pub fn from_config(
        config: &SnapSphereConfig,
        feed: Arc<dyn PhotoFeed>,
        details: Arc<dyn PlaceDetailsSource>,
    ) -> Self {
        Self::builder()
            .feed(feed)
            .details(details)
            .radius_km(config.feed.radius_km)
            .max_places(config.feed.max_places)
            .lookup_concurrency(config.feed.lookup_concurrency)
            .initial_center(config.location.fallback)
            .initial_zoom(config.location.initial_zoom)
            .focus_zoom(config.location.focus_zoom)
            .build()
    }

    /// Recenters on a resolved location and loads its spots.
    pub async fn apply_resolution(
        &self,
        resolution: &Resolution,
    ) -> Result<CycleOutcome, SnapSphereError> {
        let coordinate = resolution.coordinate;
        coordinate.validate()?;
        self.with_state(|state| {
            state.viewport.recenter(coordinate, self.focus_zoom);
            state.notice = match &resolution.source {
                LocationSource::Fallback { reason } => Some(format!(
                    "{reason}. Showing spots around the default location."
                )),
                _ => None,
            };
        });
        self.move_reference(coordinate).await
    }

    /// Moves the reference coordinate and loads its spots, unless they are already shown.
    ///
    /// Clears the fallback notice left by an earlier [`SpotExplorer::apply_resolution`].
    pub async fn set_reference(
        &self,
        coordinate: Coordinate,
    ) -> Result<CycleOutcome, SnapSphereError> {
        coordinate.validate()?;
        self.with_state(|state| state.notice = None);
        self.move_reference(coordinate).await
    }

    async fn move_reference(
        &self,
        coordinate: Coordinate,
    ) -> Result<CycleOutcome, SnapSphereError> {
        let unchanged = self.with_state(|state| {
            state.reference == Some(coordinate) && state.loaded_for == Some(coordinate)
        });
        if unchanged {
            debug!(%coordinate, "Reference unchanged, keeping current spots");
            return Ok(CycleOutcome::Unchanged);
        }
        self.run_cycle(coordinate).await
    }

    /// Reloads the spots around the current reference coordinate.
    pub async fn refresh(&self) -> Result<CycleOutcome, SnapSphereError> {
        let reference = self
            .with_state(|state| state.reference)
            .ok_or(SnapSphereError::NoReference)?;
        self.run_cycle(reference).await
    }

    async fn run_cycle(&self, reference: Coordinate) -> Result<CycleOutcome, SnapSphereError> {
        let token = self.guard.begin();
        info!(cycle = token.value(), %reference, "Loading spots");
        self.with_state(|state| {
            state.reference = Some(reference);
            state.status = Some(Status::loading("Fetching nearby photos..."));
        });

        let query = AreaQuery::new(reference, self.radius_km);
        let raw = match fetch_feed(self.feed.as_ref(), &query, token).await {
            Ok(raw) => raw,
            Err(error) => {
                if !self.guard.is_current(token) {
                    debug!(cycle = token.value(), %error, "Superseded cycle failed, ignoring");
                    return Ok(CycleOutcome::Superseded);
                }
                warn!(cycle = token.value(), %error, "Feed fetch failed, keeping previous spots");
                self.with_state(|state| {
                    state.status = Some(Status::error(format!("Failed to load spots: {error}")));
                });
                return Err(error.into());
            }
        };

        if !self.guard.is_current(token) {
            return Ok(self.superseded(token));
        }
        self.with_state(|state| {
            state.status = Some(Status::loading(format!(
                "Fetching details for {} photos...",
                raw.len()
            )));
        });

        let photos = enrich_photos(self.details.as_ref(), raw, self.lookup_concurrency).await;
        self.publish(token, reference, photos)
    }

    fn publish(
        &self,
        token: CycleToken,
        reference: Coordinate,
        photos: Vec<EnrichedPhoto>,
    ) -> Result<CycleOutcome, SnapSphereError> {
        let outcome = self.with_state(|state| {
            // Checked under the lock so a newer cycle can't publish in between.
            if !self.guard.is_current(token) {
                return None;
            }
            let places = aggregate_capped(&photos, &state.vibes, self.max_places).len();
            let count = photos.len();
            state.photos = photos;
            state.loaded_for = Some(reference);
            state.selected = None;
            state.status = Some(if count == 0 {
                Status::error("No photos found nearby")
            } else {
                Status::success(format!("Found {count} photos at {places} places nearby"))
            });
            Some(CycleOutcome::Applied {
                photos: count,
                places,
            })
        });

        match outcome {
            Some(applied) => {
                info!(cycle = token.value(), ?applied, "Spots updated");
                Ok(applied)
            }
            None => Ok(self.superseded(token)),
        }
    }

    fn superseded(&self, token: CycleToken) -> CycleOutcome {
        debug!(
            cycle = token.value(),
            latest = ?self.guard.latest().map(|t| t.value()),
            "Dropping results of superseded cycle"
        );
        CycleOutcome::Superseded
    }

    /// Selects or deselects a vibe. Returns whether it is now selected.
    pub fn toggle_vibe(&self, tag: &str) -> bool {
        self.with_state(|state| state.vibes.toggle(tag))
    }

    /// Selects a vibe, leaving it selected if it already was.
    pub fn select_vibe(&self, tag: &str) {
        self.with_state(|state| state.vibes.select(tag));
    }

    pub fn clear_vibes(&self) {
        self.with_state(|state| state.vibes.clear());
    }

    pub fn vibes(&self) -> Vec<String> {
        self.with_state(|state| state.vibes.tags().to_vec())
    }

    pub fn reference(&self) -> Option<Coordinate> {
        self.with_state(|state| state.reference)
    }

    pub fn status(&self) -> Option<Status> {
        self.with_state(|state| state.status.clone())
    }

    pub fn notice(&self) -> Option<String> {
        self.with_state(|state| state.notice.clone())
    }

    pub fn viewport(&self) -> Viewport {
        self.with_state(|state| state.viewport)
    }

    /// The enriched photos of the last applied cycle, in feed order.
    pub fn photos(&self) -> Vec<EnrichedPhoto> {
        self.with_state(|state| state.photos.clone())
    }

    pub fn places(&self) -> Vec<DedupedPlace> {
        self.with_state(|state| aggregate_capped(&state.photos, &state.vibes, self.max_places))
    }

    pub fn trending(&self, limit: Option<usize>) -> Vec<DedupedPlace> {
        trending(&self.places(), limit.unwrap_or(TRENDING_LIMIT))
    }

    pub fn markers(&self) -> Vec<MarkerDescriptor> {
        self.with_state(|state| self.markers_for(state))
    }

    fn markers_for(&self, state: &ViewState) -> Vec<MarkerDescriptor> {
        let places = aggregate_capped(&state.photos, &state.vibes, self.max_places);
        state
            .reference
            .map(map::user_marker)
            .into_iter()
            .chain(map::place_markers(&places, state.selected))
            .collect()
    }

    /// Opens the place at `index` of [`Self::places`]. Returns the photo it stands for.
    pub fn select_place(&self, index: usize) -> Option<EnrichedPhoto> {
        self.with_state(|state| {
            let places = aggregate_capped(&state.photos, &state.vibes, self.max_places);
            let place = places.get(index)?;
            let photo = state.photos.get(place.source_index)?.clone();
            state.selected = Some(photo.id);
            Some(photo)
        })
    }

    /// Opens a photo by id, e.g. from a marker click.
    pub fn select_photo(&self, id: PhotoId) -> Option<EnrichedPhoto> {
        self.with_state(|state| {
            let index = position_of(&state.photos, id)?;
            state.selected = Some(id);
            Some(state.photos[index].clone())
        })
    }

    pub fn selected(&self) -> Option<EnrichedPhoto> {
        self.with_state(|state| {
            let id = state.selected?;
            position_of(&state.photos, id).map(|i| state.photos[i].clone())
        })
    }

    pub fn clear_selection(&self) {
        self.with_state(|state| state.selected = None);
    }

    pub fn snapshot(&self) -> ExplorerSnapshot {
        self.with_state(|state| {
            let places = aggregate_capped(&state.photos, &state.vibes, self.max_places);
            let selected = state
                .selected
                .and_then(|id| position_of(&state.photos, id))
                .map(|i| state.photos[i].clone());
            ExplorerSnapshot {
                reference: state.reference,
                status: state.status.clone(),
                notice: state.notice.clone(),
                viewport: state.viewport,
                vibes: state.vibes.tags().to_vec(),
                photos: state.photos.clone(),
                trending: trending(&places, TRENDING_LIMIT),
                markers: self.markers_for(state),
                places,
                selected,
            }
        })
    }

    /// The lock is never held across an await.
    fn with_state<T>(&self, f: impl FnOnce(&mut ViewState) -> T) -> T {
        let mut guard: MutexGuard<'_, ViewState> = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}
