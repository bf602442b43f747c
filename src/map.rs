//! What a map surface needs to draw: the viewport and marker descriptors.
use crate::pipeline::DedupedPlace;
use crate::types::{Coordinate, PhotoId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
}

impl Viewport {
    pub fn recenter(&mut self, center: Coordinate, zoom: u8) {
        self.center = center;
        self.zoom = zoom;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerIcon {
    /// The reference coordinate.
    User,
    Spot,
    /// The spot whose details are open.
    Selected,
}

impl MarkerIcon {
    pub fn url(&self) -> &'static str {
        match self {
            MarkerIcon::User => "https://maps.google.com/mapfiles/ms/icons/orange-dot.png",
            MarkerIcon::Spot => "https://maps.google.com/mapfiles/ms/icons/green-dot.png",
            MarkerIcon::Selected => "https://maps.google.com/mapfiles/ms/icons/yellow-dot.png",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerDescriptor {
    /// `None` for the user marker. Click events carry this id back.
    pub photo_id: Option<PhotoId>,
    pub position: Coordinate,
    pub icon: MarkerIcon,
    pub title: String,
}

pub fn user_marker(reference: Coordinate) -> MarkerDescriptor {
    MarkerDescriptor {
        photo_id: None,
        position: reference,
        icon: MarkerIcon::User,
        title: "Your Location".to_string(),
    }
}

/// One marker per place, in place order, so markers and sidebar rows line up.
pub fn place_markers(places: &[DedupedPlace], selected: Option<PhotoId>) -> Vec<MarkerDescriptor> {
    places
        .iter()
        .map(|place| {
            let icon = if selected == Some(place.photo.id) {
                MarkerIcon::Selected
            } else {
                MarkerIcon::Spot
            };
            MarkerDescriptor {
                photo_id: Some(place.photo.id),
                position: place.photo.coordinate(),
                icon,
                title: place.photo.vibes.join(", "),
            }
        })
        .collect()
}
