use crate::backend::wire::{NearbyPhoto, PlaceDetails};
use crate::pipeline::cycle::CycleToken;
use crate::types::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const UNKNOWN_PLACE: &str = "Unknown Place";
pub const UNKNOWN_ADDRESS: &str = "Unknown Address";
pub const UNKNOWN_SUBMITTER: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";

/// Synthetic identifier handed out when a photo enters the pipeline.
///
/// `photo_url` is not unique across the feed, so selections are resolved through
/// this id instead. The position is the photo's index in the fetched feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct PhotoId {
    pub cycle: u64,
    pub position: usize,
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.cycle, self.position)
    }
}

/// A geotagged image reference as returned by the photo index.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawPhoto {
    pub id: PhotoId,
    pub photo_url: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Tags the index already knows about. Only used when enrichment fails.
    pub feed_vibes: Vec<String>,
}

impl RawPhoto {
    /// Converts a feed record, dropping it if its coordinates are missing or invalid.
    pub fn from_nearby(record: NearbyPhoto, cycle: CycleToken, position: usize) -> Option<Self> {
        let (Some(latitude), Some(longitude)) = (record.latitude, record.longitude) else {
            return None;
        };
        Coordinate::new(latitude, longitude).ok()?;
        Some(Self {
            id: PhotoId {
                cycle: cycle.value(),
                position,
            },
            photo_url: record.photo_url.unwrap_or_default(),
            latitude,
            longitude,
            feed_vibes: normalize_vibes(record.vibes.unwrap_or_default()),
        })
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.latitude,
            lng: self.longitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum CrowdLevel {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "N/A")]
    Unknown,
}

impl CrowdLevel {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "low" => CrowdLevel::Low,
            "medium" => CrowdLevel::Medium,
            "high" => CrowdLevel::High,
            _ => CrowdLevel::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CrowdLevel::Low => "low",
            CrowdLevel::Medium => "medium",
            CrowdLevel::High => "high",
            CrowdLevel::Unknown => NOT_AVAILABLE,
        }
    }
}

impl fmt::Display for CrowdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the place metadata came from the backend or was substituted after a failed lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum EnrichmentStatus {
    Resolved,
    Defaulted { reason: String },
}

/// A `RawPhoto` joined with its place details.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EnrichedPhoto {
    pub id: PhotoId,
    pub photo_url: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Display order is preserved, matching ignores it.
    pub vibes: Vec<String>,
    pub place_name: String,
    pub description: String,
    pub best_time: String,
    pub crowd_level: CrowdLevel,
    pub safety_notes: String,
    /// Always within `[0, 5]`, `0` when the backend has no rating.
    pub rating: f64,
    pub submitted_by: String,
    pub full_address: String,
    pub enrichment: EnrichmentStatus,
}

impl EnrichedPhoto {
    pub fn from_details(raw: RawPhoto, details: PlaceDetails) -> Self {
        Self {
            id: raw.id,
            photo_url: raw.photo_url,
            latitude: raw.latitude,
            longitude: raw.longitude,
            vibes: normalize_vibes(details.vibes.unwrap_or_default()),
            place_name: non_blank(details.place_name).unwrap_or_else(|| UNKNOWN_PLACE.to_string()),
            description: details.description.unwrap_or_default(),
            best_time: non_blank(details.best_time).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            crowd_level: details
                .crowd_level
                .as_deref()
                .map_or(CrowdLevel::Unknown, CrowdLevel::from_label),
            safety_notes: non_blank(details.safety_notes)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            rating: clamp_rating(details.rating),
            submitted_by: non_blank(details.submitted_by)
                .unwrap_or_else(|| UNKNOWN_SUBMITTER.to_string()),
            full_address: non_blank(details.full_address)
                .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string()),
            enrichment: EnrichmentStatus::Resolved,
        }
    }

    /// The record used when a place-details lookup fails. Keeps the photo in the list.
    pub fn defaulted(raw: RawPhoto, reason: impl Into<String>) -> Self {
        Self {
            id: raw.id,
            photo_url: raw.photo_url,
            latitude: raw.latitude,
            longitude: raw.longitude,
            vibes: raw.feed_vibes,
            place_name: UNKNOWN_PLACE.to_string(),
            description: String::new(),
            best_time: NOT_AVAILABLE.to_string(),
            crowd_level: CrowdLevel::Unknown,
            safety_notes: NOT_AVAILABLE.to_string(),
            rating: 0.0,
            submitted_by: UNKNOWN_SUBMITTER.to_string(),
            full_address: UNKNOWN_ADDRESS.to_string(),
            enrichment: EnrichmentStatus::Defaulted {
                reason: reason.into(),
            },
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.latitude,
            lng: self.longitude,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self.enrichment, EnrichmentStatus::Defaulted { .. })
    }

    pub fn has_vibe(&self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        self.vibes
            .iter()
            .any(|vibe| vibe.trim().to_lowercase() == tag)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn clamp_rating(rating: Option<f64>) -> f64 {
    match rating {
        Some(r) if r.is_finite() => r.clamp(0.0, 5.0),
        _ => 0.0,
    }
}

/// The backend stores vibes comma-joined, so empty and padded entries show up.
pub(crate) fn normalize_vibes(vibes: Vec<String>) -> Vec<String> {
    vibes
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
