//! In-memory backend used by the pipeline and explorer tests.
use crate::backend::wire::{
    AreaQuery, NearbyPhoto, PlaceDetails, PlaceDetailsRequest, RefreshSummary,
};
use crate::backend::{BackendError, PhotoFeed, PlaceDetailsSource};
use crate::types::Coordinate;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub(crate) fn nearby(url: &str, lat: f64, lng: f64) -> NearbyPhoto {
    NearbyPhoto {
        photo_url: Some(url.to_string()),
        latitude: Some(lat),
        longitude: Some(lng),
        vibes: None,
        distance_km: None,
    }
}

pub(crate) fn details(place_name: &str, rating: f64, vibes: &[&str]) -> PlaceDetails {
    PlaceDetails {
        place_name: Some(place_name.to_string()),
        description: Some(format!("A spot called {place_name}")),
        vibes: Some(vibes.iter().map(|v| v.to_string()).collect()),
        best_time: Some("Golden Hour (6-7 PM)".to_string()),
        crowd_level: Some("low".to_string()),
        safety_notes: Some("Well-lit area.".to_string()),
        rating: Some(rating),
        submitted_by: Some("Sarah M.".to_string()),
        full_address: Some(format!("{place_name}, Toronto, Ontario, Canada")),
    }
}

fn area_key(center: Coordinate) -> String {
    format!("{:.4},{:.4}", center.lat, center.lng)
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    areas: HashMap<String, Vec<NearbyPhoto>>,
    details: HashMap<String, PlaceDetails>,
    gates: HashMap<String, Arc<Notify>>,
    fail_refresh: AtomicBool,
    fail_query: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_area(mut self, center: Coordinate, photos: Vec<NearbyPhoto>) -> Self {
        self.areas.insert(area_key(center), photos);
        self
    }

    pub(crate) fn with_details(mut self, url: &str, details: PlaceDetails) -> Self {
        self.details.insert(url.to_string(), details);
        self
    }

    /// Holds the query for `center` until the returned `Notify` is signalled.
    pub(crate) fn with_gate(mut self, center: Coordinate) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gates.insert(area_key(center), gate.clone());
        (self, gate)
    }

    pub(crate) fn fail_refresh(&self, fail: bool) {
        self.fail_refresh.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_query(&self, fail: bool) {
        self.fail_query.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub(crate) fn saw(&self, call: &str) -> bool {
        self.calls().iter().any(|c| c == call)
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

fn server_error() -> BackendError {
    BackendError::Api {
        status: 500,
        message: "boom".to_string(),
    }
}

#[async_trait]
impl PhotoFeed for FakeBackend {
    async fn refresh_area(&self, query: &AreaQuery) -> Result<RefreshSummary, BackendError> {
        self.record(format!("refresh {}", area_key(query.center())));
        if self.fail_refresh.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(RefreshSummary { count: 0 })
    }

    async fn photos_nearby(&self, query: &AreaQuery) -> Result<Vec<NearbyPhoto>, BackendError> {
        let key = area_key(query.center());
        self.record(format!("query {key}"));
        if let Some(gate) = self.gates.get(&key) {
            gate.notified().await;
        }
        if self.fail_query.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(self.areas.get(&key).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl PlaceDetailsSource for FakeBackend {
    async fn place_details(
        &self,
        request: &PlaceDetailsRequest,
    ) -> Result<PlaceDetails, BackendError> {
        self.record(format!("details {}", request.photo_url));
        // Let sibling lookups interleave like real network calls would.
        tokio::task::yield_now().await;
        self.details.get(&request.photo_url).cloned().ok_or(BackendError::Api {
            status: 400,
            message: "latitude, longitude, and photo_url required".to_string(),
        })
    }
}
