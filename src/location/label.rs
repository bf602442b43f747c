use crate::types::Coordinate;
use reverse_geocoder::ReverseGeocoder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The nearest known populated place to a coordinate.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationName {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub admin1: String,
    pub admin2: String,
    pub country_code: String,
    pub country_name: Option<String>,
}

impl fmt::Display for LocationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let country = self.country_name.as_deref().unwrap_or(&self.country_code);
        if self.admin1.is_empty() {
            write!(f, "{}, {}", self.name, country)
        } else {
            write!(f, "{}, {}, {}", self.name, self.admin1, country)
        }
    }
}

/// Offline reverse geocoding. Loading the place table takes a moment, so build one
/// labeler and share it.
#[derive(Clone)]
pub struct PlaceLabeler {
    geocoder: Arc<ReverseGeocoder>,
}

impl fmt::Debug for PlaceLabeler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaceLabeler").finish_non_exhaustive()
    }
}

impl Default for PlaceLabeler {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaceLabeler {
    pub fn new() -> Self {
        Self {
            geocoder: Arc::new(ReverseGeocoder::new()),
        }
    }

    pub fn label(&self, coordinate: Coordinate) -> LocationName {
        let search_result = self.geocoder.search((coordinate.lat, coordinate.lng));
        let record = search_result.record;
        let country_name = rust_iso3166::from_alpha2(&record.cc).map(|c| c.name.to_string());

        LocationName {
            latitude: record.lat,
            longitude: record.lon,
            name: record.name.clone(),
            admin1: record.admin1.clone(),
            admin2: record.admin2.clone(),
            country_code: record.cc.clone(),
            country_name,
        }
    }
}
