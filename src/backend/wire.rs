//! JSON bodies exchanged with the backend. Field names follow the backend's snake_case.
use crate::types::Coordinate;
use serde::{Deserialize, Serialize};

/// The area a feed cycle covers. `radius_km` uses the backend's kilometre convention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    /// Server-side vibe filter. Only honoured by the query call.
    #[serde(skip)]
    pub vibe: Option<String>,
}

impl AreaQuery {
    pub fn new(center: Coordinate, radius_km: f64) -> Self {
        Self {
            latitude: center.lat,
            longitude: center.lng,
            radius: radius_km,
            vibe: None,
        }
    }

    pub fn with_vibe(mut self, vibe: impl Into<String>) -> Self {
        self.vibe = Some(vibe.into());
        self
    }

    pub fn center(&self) -> Coordinate {
        Coordinate {
            lat: self.latitude,
            lng: self.longitude,
        }
    }

    /// Query-string pairs for `GET /photos_nearby`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            ("radius", self.radius.to_string()),
        ];
        if let Some(vibe) = self.vibe.as_ref().filter(|v| !v.trim().is_empty()) {
            pairs.push(("vibe", vibe.trim().to_string()));
        }
        pairs
    }
}

/// Response of `POST /fetch_mapillary_photos`. Only used for logging.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RefreshSummary {
    #[serde(default)]
    pub count: usize,
}

impl RefreshSummary {
    /// Reads the count if the body has one. Empty or non-JSON bodies give a zero count.
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NearbyResponse {
    #[serde(default)]
    pub photos: Vec<NearbyPhoto>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NearbyPhoto {
    pub photo_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub vibes: Option<Vec<String>>,
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceDetailsRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub photo_url: String,
}

/// Response of `POST /place_details`. Everything is optional, gaps are defaulted on join.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PlaceDetails {
    pub place_name: Option<String>,
    pub description: Option<String>,
    pub vibes: Option<Vec<String>>,
    pub best_time: Option<String>,
    pub crowd_level: Option<String>,
    pub safety_notes: Option<String>,
    pub rating: Option<f64>,
    pub submitted_by: Option<String>,
    pub full_address: Option<String>,
}

/// The `{"error": "..."}` body the backend sends with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
