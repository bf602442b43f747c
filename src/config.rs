//! Configuration, layered as TOML file → environment → CLI flags.
use crate::types::Coordinate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const BACKEND_URL_ENV: &str = "SNAPSPHERE_BACKEND_URL";
pub const GEOCODER_URL_ENV: &str = "SNAPSPHERE_GEOCODER_URL";

/// Geolocation lookups may not be cut off sooner than this.
pub const MIN_GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SnapSphereConfig {
    pub backend: BackendConfig,
    pub geocoder: GeocoderConfig,
    pub location: LocationConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
            request_timeout_secs: 30,
            user_agent: "SnapSphere/1.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocationConfig {
    pub fallback: Coordinate,
    pub geolocation_timeout_secs: u64,
    pub initial_zoom: u8,
    pub focus_zoom: u8,
    /// Attach an offline reverse-geocoded name to every resolved location.
    pub label_locations: bool,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            fallback: Coordinate::FALLBACK,
            geolocation_timeout_secs: 15,
            initial_zoom: 13,
            focus_zoom: 15,
            label_locations: true,
        }
    }
}

impl LocationConfig {
    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_secs(self.geolocation_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    pub radius_km: f64,
    pub max_places: usize,
    pub lookup_concurrency: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            radius_km: 2.0,
            max_places: crate::pipeline::aggregate::MAX_PLACES,
            lookup_concurrency: 16,
        }
    }
}

impl SnapSphereConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: SnapSphereConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a TOML file, applies environment overrides and validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                info!(path = %path.display(), "Loading config file");
                toml::from_str(&std::fs::read_to_string(path)?)?
            }
            None => SnapSphereConfig::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(BACKEND_URL_ENV).ok(),
            std::env::var(GEOCODER_URL_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, backend_url: Option<String>, geocoder_url: Option<String>) {
        if let Some(url) = backend_url.filter(|u| !u.trim().is_empty()) {
            info!("Backend URL loaded from environment variable");
            self.backend.base_url = url;
        }
        if let Some(url) = geocoder_url.filter(|u| !u.trim().is_empty()) {
            info!("Geocoder URL loaded from environment variable");
            self.geocoder.base_url = url;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("backend.base_url is empty".into()));
        }
        if self.location.geolocation_timeout() < MIN_GEOLOCATION_TIMEOUT {
            return Err(ConfigError::Invalid(format!(
                "location.geolocation_timeout_secs must be at least {}",
                MIN_GEOLOCATION_TIMEOUT.as_secs()
            )));
        }
        self.location
            .fallback
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("location.fallback: {e}")))?;
        if !(self.feed.radius_km.is_finite() && self.feed.radius_km > 0.0) {
            return Err(ConfigError::Invalid("feed.radius_km must be positive".into()));
        }
        if self.feed.max_places == 0 {
            return Err(ConfigError::Invalid("feed.max_places must be at least 1".into()));
        }
        if self.feed.lookup_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "feed.lookup_concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
