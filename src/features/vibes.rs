use crate::backend::BackendClient;
use crate::features::{FeatureError, check_image_url};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VibeInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

const fn vibe(id: &'static str, label: &'static str, icon: &'static str) -> VibeInfo {
    VibeInfo { id, label, icon }
}

/// The vibes offered as map filters, in display order.
pub const VIBE_CATALOG: &[VibeInfo] = &[
    vibe("moody", "Moody", "🌫️"),
    vibe("urban", "Urban", "🏙️"),
    vibe("nature", "Nature", "🌿"),
    vibe("colorful", "Colorful", "🌈"),
    vibe("peaceful", "Peaceful", "🧘"),
    vibe("vintage", "Vintage", "🏛️"),
    vibe("graffiti", "Graffiti", "🎨"),
    vibe("trail", "Trail", "🥾"),
    vibe("abandoned", "Abandoned", "🏚️"),
    vibe("calm", "Calm", "🌊"),
    vibe("modern", "Modern", "✨"),
];

pub fn vibe_info(id: &str) -> Option<&'static VibeInfo> {
    let id = id.trim();
    VIBE_CATALOG.iter().find(|v| v.id.eq_ignore_ascii_case(id))
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    image_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct Classification {
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct VibeAnalysis {
    pub primary_vibe: String,
    pub secondary_vibes: Vec<String>,
    /// Probability of the primary vibe, `0.0..=1.0`.
    pub confidence_score: f64,
    pub color_palette: Vec<String>,
    pub mood_score: f64,
    pub style_tags: Vec<String>,
}

impl VibeAnalysis {
    /// Primary vibe first, then the secondary ones.
    pub fn all_vibes(&self) -> Vec<&str> {
        std::iter::once(self.primary_vibe.as_str())
            .chain(self.secondary_vibes.iter().map(String::as_str))
            .filter(|v| !v.is_empty())
            .collect()
    }
}

impl BackendClient {
    /// The backend's top vibe tags for an image.
    pub async fn classify(&self, image_url: &str) -> Result<Vec<String>, FeatureError> {
        let image_url = check_image_url(image_url)?;
        let classification: Classification = self
            .post_json("classify", &ImageRequest { image_url })
            .await?;
        debug!(tags = ?classification.tags, "Image classified");
        Ok(classification.tags)
    }

    pub async fn analyze_vibe(&self, image_url: &str) -> Result<VibeAnalysis, FeatureError> {
        let image_url = check_image_url(image_url)?;
        let analysis = self
            .post_json("analyze_vibe", &ImageRequest { image_url })
            .await?;
        Ok(analysis)
    }
}
