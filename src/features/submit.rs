use crate::backend::BackendClient;
use crate::features::{FeatureError, check_image_url};
use crate::types::{Coordinate, CrowdLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpotSubmission {
    pub photo_url: String,
    pub latitude: f64,
    pub longitude: f64,
    /// When the photo was taken. The backend uses the upload time when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl SpotSubmission {
    pub fn new(photo_url: impl Into<String>, location: Coordinate) -> Self {
        Self {
            photo_url: photo_url.into(),
            latitude: location.lat,
            longitude: location.lng,
            timestamp: None,
        }
    }

    pub fn taken_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    fn validate(&self) -> Result<(), FeatureError> {
        check_image_url(&self.photo_url)?;
        Coordinate::new(self.latitude, self.longitude)?;
        Ok(())
    }
}

/// What the backend learned about a submitted spot.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SubmissionReceipt {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub place_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub best_time: Option<String>,
    #[serde(default)]
    pub crowd_level: Option<String>,
    #[serde(default)]
    pub safety_notes: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub submitted_by: Option<String>,
}

impl SubmissionReceipt {
    pub fn crowd(&self) -> CrowdLevel {
        self.crowd_level
            .as_deref()
            .map_or(CrowdLevel::Unknown, CrowdLevel::from_label)
    }
}

impl BackendClient {
    /// Adds a spot to the shared map. The backend enriches and tags it on the way in.
    pub async fn submit_spot(
        &self,
        submission: &SpotSubmission,
    ) -> Result<SubmissionReceipt, FeatureError> {
        submission.validate()?;
        let receipt: SubmissionReceipt = self.post_json("add_photo", submission).await?;
        info!(
            place = receipt.place_name.as_deref().unwrap_or("?"),
            tags = ?receipt.tags,
            "Spot submitted"
        );
        Ok(receipt)
    }
}
