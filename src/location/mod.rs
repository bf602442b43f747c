//! Turns device position, typed searches and map clicks into a reference coordinate.
pub mod error;
pub mod geocoder;
pub mod geolocation;
pub mod label;

pub use error::{GeolocationError, LocationError, LocationUnavailable};
pub use geocoder::{GeocodeHit, Geocoder, NominatimGeocoder};
pub use geolocation::{FixedPosition, GeolocationProvider, NoGeolocation};
pub use label::{LocationName, PlaceLabeler};

use crate::config::{LocationConfig, MIN_GEOLOCATION_TIMEOUT};
use crate::types::Coordinate;
use bon::bon;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where a resolved coordinate came from.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationSource {
    Device,
    /// The device position could not be used. Shown to the user, never fatal.
    Fallback { reason: LocationUnavailable },
    Search { display_name: String },
    /// Typed in as "lat, lng".
    Coordinates,
    MapClick,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub coordinate: Coordinate,
    pub source: LocationSource,
    pub label: Option<LocationName>,
}

impl Resolution {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, LocationSource::Fallback { .. })
    }

    /// Short human-readable description of the resolved place.
    pub fn describe(&self) -> String {
        match (&self.source, &self.label) {
            (LocationSource::Search { display_name }, _) if !display_name.is_empty() => {
                display_name.clone()
            }
            (_, Some(label)) => label.to_string(),
            _ => self.coordinate.to_string(),
        }
    }
}

pub struct LocationResolver {
    geolocation: Arc<dyn GeolocationProvider>,
    geocoder: Arc<dyn Geocoder>,
    labeler: Option<PlaceLabeler>,
    fallback: Coordinate,
    geolocation_timeout: Duration,
}

#[bon]
impl LocationResolver {
    /// Builds a resolver.
    ///
    /// # Builder Arguments
    ///
    /// * `geolocation` - The device position provider.
    /// * `geocoder` - Free-text search backend, usually a [`NominatimGeocoder`].
    /// * `labeler` - Optional offline reverse geocoder that names every resolution.
    /// * `fallback` - (Default: downtown Toronto) Used whenever the device position is unavailable.
    /// * `geolocation_timeout` - (Default: 15s) How long to wait for the device position.
    ///   Values below 8 seconds are raised to 8 seconds.
    #[builder]
    pub fn new(
        geolocation: Arc<dyn GeolocationProvider>,
        geocoder: Arc<dyn Geocoder>,
        labeler: Option<PlaceLabeler>,
        #[builder(default = Coordinate::FALLBACK)] fallback: Coordinate,
        #[builder(default = Duration::from_secs(15))] geolocation_timeout: Duration,
    ) -> Self {
        Self {
            geolocation,
            geocoder,
            labeler,
            fallback,
            geolocation_timeout: geolocation_timeout.max(MIN_GEOLOCATION_TIMEOUT),
        }
    }

    pub fn from_config(
        config: &LocationConfig,
        geolocation: Arc<dyn GeolocationProvider>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        Self::builder()
            .geolocation(geolocation)
            .geocoder(geocoder)
            .maybe_labeler(config.label_locations.then(PlaceLabeler::new))
            .fallback(config.fallback)
            .geolocation_timeout(config.geolocation_timeout())
            .build()
    }

    pub fn fallback(&self) -> Coordinate {
        self.fallback
    }

    pub fn geolocation_timeout(&self) -> Duration {
        self.geolocation_timeout
    }

    /// Asks the device for its position. Always yields a coordinate: denial, errors and
    /// timeouts resolve to the fallback with the reason attached.
    pub async fn locate(&self) -> Resolution {
        let attempt =
            tokio::time::timeout(self.geolocation_timeout, self.geolocation.current_position())
                .await;

        let outcome = match attempt {
            Ok(Ok(coordinate)) => match coordinate.validate() {
                Ok(()) => Ok(coordinate),
                Err(e) => Err(LocationUnavailable::Failed(e.to_string())),
            },
            Ok(Err(e)) => Err(LocationUnavailable::from(e)),
            Err(_) => Err(LocationUnavailable::TimedOut(self.geolocation_timeout)),
        };

        match outcome {
            Ok(coordinate) => {
                info!(%coordinate, "Using device location");
                self.resolve(coordinate, LocationSource::Device)
            }
            Err(reason) => {
                warn!(
                    %reason,
                    fallback = %self.fallback,
                    "Device location unavailable, using fallback"
                );
                self.resolve(self.fallback, LocationSource::Fallback { reason })
            }
        }
    }

    /// Resolves typed text, either a "lat, lng" pair or a free-text place name.
    pub async fn search(&self, text: &str) -> Result<Resolution, LocationError> {
        let query = text.trim();
        if query.is_empty() {
            return Err(LocationError::NotFound {
                query: query.to_string(),
            });
        }

        if let Some((lat, lng)) = parse_coordinates(query) {
            let coordinate = Coordinate::new(lat, lng)?;
            debug!(%coordinate, "Search text is a coordinate pair");
            return Ok(self.resolve(coordinate, LocationSource::Coordinates));
        }

        let hit = self
            .geocoder
            .search(query)
            .await
            .map_err(LocationError::Geocoder)?
            .ok_or_else(|| LocationError::NotFound {
                query: query.to_string(),
            })?;
        info!(query, coordinate = %hit.coordinate, "Search resolved");

        Ok(self.resolve(
            hit.coordinate,
            LocationSource::Search {
                display_name: hit.display_name,
            },
        ))
    }

    pub fn from_map_click(&self, coordinate: Coordinate) -> Result<Resolution, LocationError> {
        coordinate.validate()?;
        Ok(self.resolve(coordinate, LocationSource::MapClick))
    }

    fn resolve(&self, coordinate: Coordinate, source: LocationSource) -> Resolution {
        Resolution {
            coordinate,
            source,
            label: self.labeler.as_ref().map(|l| l.label(coordinate)),
        }
    }
}

/// Parses "43.65, -79.38" or "43.65 -79.38".
fn parse_coordinates(text: &str) -> Option<(f64, f64)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^\s*([-+]?\d{1,3}(?:\.\d+)?)\s*(?:,|\s)\s*([-+]?\d{1,3}(?:\.\d+)?)\s*$")
            .unwrap()
    });

    let caps = re.captures(text)?;
    let lat = caps.get(1)?.as_str().parse().ok()?;
    let lng = caps.get(2)?.as_str().parse().ok()?;
    Some((lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeGeocoder {
        hits: Vec<(&'static str, GeocodeHit)>,
        fail: bool,
        queries: Mutex<Vec<String>>,
    }

    impl FakeGeocoder {
        fn new() -> Self {
            Self {
                hits: vec![(
                    "high park",
                    GeocodeHit {
                        coordinate: Coordinate::new(43.6465, -79.4637).unwrap(),
                        display_name: "High Park, Toronto".to_string(),
                    },
                )],
                fail: false,
                queries: Mutex::new(vec![]),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn search(&self, query: &str) -> Result<Option<GeocodeHit>, BackendError> {
            self.queries.lock().unwrap().push(query.to_string());
            if self.fail {
                return Err(BackendError::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            Ok(self
                .hits
                .iter()
                .find(|(q, _)| q.eq_ignore_ascii_case(query))
                .map(|(_, hit)| hit.clone()))
        }
    }

    struct PendingPosition;

    #[async_trait]
    impl GeolocationProvider for PendingPosition {
        async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
            std::future::pending().await
        }
    }

    struct DeniedPosition;

    #[async_trait]
    impl GeolocationProvider for DeniedPosition {
        async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
            Err(GeolocationError::PermissionDenied)
        }
    }

    fn resolver(geolocation: Arc<dyn GeolocationProvider>) -> LocationResolver {
        LocationResolver::builder()
            .geolocation(geolocation)
            .geocoder(Arc::new(FakeGeocoder::new()))
            .build()
    }

    #[tokio::test]
    async fn test_locate_uses_device_position() {
        let here = Coordinate::new(51.5074, -0.1278).unwrap();
        let resolution = resolver(Arc::new(FixedPosition(here))).locate().await;

        assert_eq!(resolution.coordinate, here);
        assert_eq!(resolution.source, LocationSource::Device);
        assert!(resolution.label.is_none());
    }

    #[tokio::test]
    async fn test_denied_permission_falls_back() {
        let resolution = resolver(Arc::new(DeniedPosition)).locate().await;

        assert_eq!(resolution.coordinate, Coordinate::FALLBACK);
        assert_eq!(
            resolution.source,
            LocationSource::Fallback {
                reason: LocationUnavailable::Denied
            }
        );
    }

    #[tokio::test]
    async fn test_unsupported_geolocation_falls_back() {
        let resolution = resolver(Arc::new(NoGeolocation)).locate().await;
        assert!(resolution.is_fallback());
        assert_eq!(resolution.coordinate, Coordinate::FALLBACK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_device_times_out_to_fallback() {
        let resolver = resolver(Arc::new(PendingPosition));

        let resolution = resolver.locate().await;

        assert_eq!(resolution.coordinate, Coordinate::FALLBACK);
        assert_eq!(
            resolution.source,
            LocationSource::Fallback {
                reason: LocationUnavailable::TimedOut(Duration::from_secs(15))
            }
        );
    }

    #[test]
    fn test_timeout_is_never_below_eight_seconds() {
        let resolver = LocationResolver::builder()
            .geolocation(Arc::new(NoGeolocation))
            .geocoder(Arc::new(FakeGeocoder::new()))
            .geolocation_timeout(Duration::from_secs(2))
            .build();
        assert_eq!(resolver.geolocation_timeout(), Duration::from_secs(8));
    }

    #[tokio::test]
    async fn test_search_geocodes_place_names() {
        let resolution = resolver(Arc::new(NoGeolocation))
            .search("  High Park ")
            .await
            .unwrap();

        assert_eq!(resolution.coordinate, Coordinate::new(43.6465, -79.4637).unwrap());
        assert_eq!(resolution.describe(), "High Park, Toronto");
    }

    #[tokio::test]
    async fn test_search_accepts_coordinate_pairs() {
        let geocoder = Arc::new(FakeGeocoder::new());
        let resolver = LocationResolver::builder()
            .geolocation(Arc::new(NoGeolocation))
            .geocoder(geocoder.clone())
            .build();

        let resolution = resolver.search("43.6426, -79.3871").await.unwrap();

        assert_eq!(resolution.coordinate, Coordinate::new(43.6426, -79.3871).unwrap());
        assert_eq!(resolution.source, LocationSource::Coordinates);
        assert!(
            geocoder.queries.lock().unwrap().is_empty(),
            "Coordinate pairs never hit the geocoder"
        );
    }

    #[tokio::test]
    async fn test_search_rejects_out_of_range_pairs() {
        let result = resolver(Arc::new(NoGeolocation)).search("95, 10").await;
        assert!(matches!(result, Err(LocationError::InvalidCoordinate(_))));
    }

    #[tokio::test]
    async fn test_blank_and_unknown_searches_are_not_found() {
        let resolver = resolver(Arc::new(NoGeolocation));

        assert!(matches!(
            resolver.search("   ").await,
            Err(LocationError::NotFound { .. })
        ));
        assert!(matches!(
            resolver.search("Atlantis").await,
            Err(LocationError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_geocoder_failure_is_reported() {
        let resolver = LocationResolver::builder()
            .geolocation(Arc::new(NoGeolocation))
            .geocoder(Arc::new(FakeGeocoder::failing()))
            .build();

        let result = resolver.search("High Park").await;
        assert!(matches!(result, Err(LocationError::Geocoder(_))));
    }

    #[test]
    fn test_map_click_validates() {
        let resolver = resolver(Arc::new(NoGeolocation));

        let click = Coordinate { lat: 10.0, lng: 20.0 };
        let resolution = resolver.from_map_click(click).unwrap();
        assert_eq!(resolution.source, LocationSource::MapClick);

        let bad = Coordinate { lat: 10.0, lng: 200.0 };
        assert!(resolver.from_map_click(bad).is_err());
    }

    #[test]
    fn test_labeler_names_resolutions() {
        let resolver = LocationResolver::builder()
            .geolocation(Arc::new(NoGeolocation))
            .geocoder(Arc::new(FakeGeocoder::new()))
            .labeler(PlaceLabeler::new())
            .build();

        let resolution = resolver
            .from_map_click(Coordinate::new(52.379_189, 4.899_431).unwrap())
            .unwrap();

        let label = resolution.label.unwrap();
        assert_eq!(label.name, "Amsterdam");
    }

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(parse_coordinates("43.65,-79.38"), Some((43.65, -79.38)));
        assert_eq!(parse_coordinates(" 43.65  -79.38 "), Some((43.65, -79.38)));
        assert_eq!(parse_coordinates("+1, 2"), Some((1.0, 2.0)));
        assert_eq!(parse_coordinates("Main St 12"), None);
        assert_eq!(parse_coordinates("12"), None);
    }
}
