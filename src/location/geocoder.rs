use crate::backend::BackendError;
use crate::backend::http::error_message;
use crate::config::GeocoderConfig;
use crate::types::Coordinate;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GeocodeHit {
    pub coordinate: Coordinate,
    pub display_name: String,
}

/// Free-text place search. Only the best match is of interest.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &str) -> Result<Option<GeocodeHit>, BackendError>;
}

/// Forward geocoding through an OpenStreetMap Nominatim instance.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig, user_agent: &str) -> Result<Self, BackendError> {
        // Nominatim's usage policy requires an identifying user agent.
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str) -> Result<Option<GeocodeHit>, BackendError> {
        let url = format!("{}/search", self.base_url);
        debug!(url = %url, query, "Geocoding");

        let response = self
            .http
            .get(&url)
            .query(&[("format", "jsonv2"), ("q", query), ("limit", "1")])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let places: Vec<NominatimPlace> =
            serde_json::from_str(&text).map_err(|e| BackendError::Parse(e.to_string()))?;
        first_hit(places)
    }
}

fn first_hit(places: Vec<NominatimPlace>) -> Result<Option<GeocodeHit>, BackendError> {
    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };
    let (Ok(lat), Ok(lng)) = (place.lat.trim().parse::<f64>(), place.lon.trim().parse::<f64>())
    else {
        return Err(BackendError::Parse(format!(
            "Unreadable coordinates: {}, {}",
            place.lat, place.lon
        )));
    };
    let coordinate =
        Coordinate::new(lat, lng).map_err(|e| BackendError::Parse(e.to_string()))?;

    Ok(Some(GeocodeHit {
        coordinate,
        display_name: place.display_name,
    }))
}
