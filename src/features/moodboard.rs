//! Moodboards: named collections of images laid out on a free-form canvas.
//!
//! Every call here needs a signed-in [`crate::session::Session`] on the client.
use crate::backend::BackendClient;
use crate::features::{FeatureError, check_image_url};
use bon::Builder;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MoodboardSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub item_count: usize,
}

#[derive(Debug, Deserialize)]
struct MoodboardList {
    #[serde(default)]
    moodboards: Vec<MoodboardSummary>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MoodboardItem {
    pub id: i64,
    pub image_url: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub vibes: Vec<String>,
    #[serde(default)]
    pub position_x: f64,
    #[serde(default)]
    pub position_y: f64,
    #[serde(default = "default_size")]
    pub width: f64,
    #[serde(default = "default_size")]
    pub height: f64,
    #[serde(default)]
    pub created_at: String,
}

fn default_size() -> f64 {
    200.0
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Moodboard {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub items: Vec<MoodboardItem>,
}

/// Smallest width or height an item can be resized to.
pub const MIN_ITEM_SIZE: f64 = 20.0;

impl Moodboard {
    pub fn item(&self, item_id: i64) -> Option<&MoodboardItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    /// Drags an item to a new canvas position. Returns `false` for unknown items.
    pub fn move_item(&mut self, item_id: i64, x: f64, y: f64) -> bool {
        match self.items.iter_mut().find(|i| i.id == item_id) {
            Some(item) => {
                item.position_x = x.max(0.0);
                item.position_y = y.max(0.0);
                true
            }
            None => false,
        }
    }

    pub fn resize_item(&mut self, item_id: i64, width: f64, height: f64) -> bool {
        match self.items.iter_mut().find(|i| i.id == item_id) {
            Some(item) => {
                item.width = width.max(MIN_ITEM_SIZE);
                item.height = height.max(MIN_ITEM_SIZE);
                true
            }
            None => false,
        }
    }

    pub fn remove_item(&mut self, item_id: i64) -> Option<MoodboardItem> {
        let index = self.items.iter().position(|i| i.id == item_id)?;
        Some(self.items.remove(index))
    }

    /// Every vibe on the board, most frequent first.
    pub fn vibe_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for vibe in self.items.iter().flat_map(|i| &i.vibes) {
            let vibe = vibe.trim().to_lowercase();
            if vibe.is_empty() {
                continue;
            }
            match counts.iter_mut().find(|(v, _)| *v == vibe) {
                Some((_, count)) => *count += 1,
                None => counts.push((vibe, 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Builder)]
pub struct NewMoodboard {
    #[builder(into)]
    pub name: String,
    #[builder(into, default)]
    pub description: String,
    #[builder(into, default)]
    pub theme: String,
    #[builder(default)]
    pub is_public: bool,
}

/// An image to pin on a board. Vibes left empty are filled in by the backend's classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Builder)]
pub struct NewMoodboardItem {
    #[builder(into)]
    pub image_url: String,
    #[builder(into, default)]
    pub caption: String,
    #[builder(default)]
    pub vibes: Vec<String>,
    #[builder(default = 0.0)]
    pub position_x: f64,
    #[builder(default = 0.0)]
    pub position_y: f64,
    #[builder(default = 200.0)]
    pub width: f64,
    #[builder(default = 200.0)]
    pub height: f64,
}

impl BackendClient {
    pub async fn moodboards(&self) -> Result<Vec<MoodboardSummary>, FeatureError> {
        let list: MoodboardList = self.get_json_authed("moodboards").await?;
        Ok(list.moodboards)
    }

    pub async fn create_moodboard(
        &self,
        moodboard: &NewMoodboard,
    ) -> Result<MoodboardSummary, FeatureError> {
        if moodboard.name.trim().is_empty() {
            return Err(FeatureError::MissingName);
        }
        let created: MoodboardSummary = self.post_json_authed("moodboards", moodboard).await?;
        info!(id = created.id, name = %created.name, "Moodboard created");
        Ok(created)
    }

    pub async fn moodboard(&self, id: i64) -> Result<Moodboard, FeatureError> {
        Ok(self.get_json_authed(&format!("moodboards/{id}")).await?)
    }

    pub async fn add_moodboard_item(
        &self,
        moodboard_id: i64,
        item: &NewMoodboardItem,
    ) -> Result<MoodboardItem, FeatureError> {
        check_image_url(&item.image_url)?;
        let added: MoodboardItem = self
            .post_json_authed(&format!("moodboards/{moodboard_id}/items"), item)
            .await?;
        info!(moodboard_id, item = added.id, vibes = ?added.vibes, "Item added to moodboard");
        Ok(added)
    }
}
