use crate::backend::BackendClient;
use crate::features::{FeatureError, check_image_url};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionStyle {
    #[default]
    Casual,
    Professional,
    Creative,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionMood {
    #[default]
    Happy,
    Moody,
    Inspiring,
}

impl CaptionStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionStyle::Casual => "casual",
            CaptionStyle::Professional => "professional",
            CaptionStyle::Creative => "creative",
        }
    }
}

impl CaptionMood {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionMood::Happy => "happy",
            CaptionMood::Moody => "moody",
            CaptionMood::Inspiring => "inspiring",
        }
    }
}

impl fmt::Display for CaptionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CaptionMood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaptionStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "casual" => Ok(CaptionStyle::Casual),
            "professional" => Ok(CaptionStyle::Professional),
            "creative" => Ok(CaptionStyle::Creative),
            other => Err(format!("unknown caption style '{other}'")),
        }
    }
}

impl FromStr for CaptionMood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "happy" => Ok(CaptionMood::Happy),
            "moody" => Ok(CaptionMood::Moody),
            "inspiring" => Ok(CaptionMood::Inspiring),
            other => Err(format!("unknown caption mood '{other}'")),
        }
    }
}

#[derive(Debug, Serialize)]
struct CaptionRequest<'a> {
    image_url: &'a str,
    style: CaptionStyle,
    mood: CaptionMood,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Caption {
    pub caption: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub style: CaptionStyle,
    #[serde(default)]
    pub mood: CaptionMood,
    /// The backend's fallback path reports these as `detected_vibes`.
    #[serde(default, alias = "detected_vibes")]
    pub vibes: Vec<String>,
}

impl Caption {
    /// Caption and hashtags as one postable text.
    pub fn share_text(&self) -> String {
        let caption = self.caption.trim();
        if self.hashtags.is_empty() {
            return caption.to_string();
        }
        format!("{caption}\n\n{}", self.hashtags.join(" "))
    }
}

impl BackendClient {
    pub async fn generate_caption(
        &self,
        image_url: &str,
        style: CaptionStyle,
        mood: CaptionMood,
    ) -> Result<Caption, FeatureError> {
        let image_url = check_image_url(image_url)?;
        debug!(%style, %mood, "Requesting caption");
        let caption = self
            .post_json(
                "generate_caption",
                &CaptionRequest {
                    image_url,
                    style,
                    mood,
                },
            )
            .await?;
        Ok(caption)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_uses_lowercase_names() {
        let request = CaptionRequest {
            image_url: "https://example.com/a.jpg",
            style: CaptionStyle::Professional,
            mood: CaptionMood::Inspiring,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "image_url": "https://example.com/a.jpg",
                "style": "professional",
                "mood": "inspiring"
            })
        );
    }

    #[test]
    fn test_parses_fallback_response() {
        let caption: Caption = serde_json::from_value(json!({
            "caption": "Living my best life!",
            "hashtags": ["#nature", "#calm"],
            "detected_vibes": ["nature", "peaceful", "calm"],
            "style": "casual",
            "mood": "happy"
        }))
        .unwrap();

        assert_eq!(caption.vibes, vec!["nature", "peaceful", "calm"]);
        assert_eq!(caption.share_text(), "Living my best life!\n\n#nature #calm");
    }

    #[test]
    fn test_share_text_without_hashtags() {
        let caption = Caption {
            caption: " Lost in a moody daydream ".to_string(),
            hashtags: vec![],
            style: CaptionStyle::Creative,
            mood: CaptionMood::Moody,
            vibes: vec![],
        };
        assert_eq!(caption.share_text(), "Lost in a moody daydream");
    }

    #[test]
    fn test_style_and_mood_parse() {
        assert_eq!("Creative".parse::<CaptionStyle>(), Ok(CaptionStyle::Creative));
        assert_eq!(" moody".parse::<CaptionMood>(), Ok(CaptionMood::Moody));
        assert!("loud".parse::<CaptionStyle>().is_err());
    }
}
