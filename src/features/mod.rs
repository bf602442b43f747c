//! Thin clients for the backend's AI and community endpoints.
pub mod captions;
pub mod error;
pub mod moodboard;
pub mod recommend;
pub mod submit;
pub mod sun;
pub mod vibes;

pub use error::FeatureError;

/// Accepts web URLs and inline `data:image` URLs, the two kinds the backend can fetch.
pub(crate) fn check_image_url(url: &str) -> Result<&str, FeatureError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(FeatureError::MissingImageUrl);
    }
    let lower = url.to_ascii_lowercase();
    let supported = ["http://", "https://", "data:image"];
    if supported.iter().any(|prefix| lower.starts_with(prefix)) {
        Ok(url)
    } else {
        Err(FeatureError::UnsupportedImageUrl(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_image_url() {
        assert_eq!(
            check_image_url(" https://example.com/a.jpg ").unwrap(),
            "https://example.com/a.jpg"
        );
        assert!(check_image_url("data:image/png;base64,iVBORw0KGgo=").is_ok());
        assert!(matches!(check_image_url("  "), Err(FeatureError::MissingImageUrl)));
        assert!(matches!(
            check_image_url("ftp://example.com/a.jpg"),
            Err(FeatureError::UnsupportedImageUrl(_))
        ));
        assert!(matches!(
            check_image_url("data:text/plain,hello"),
            Err(FeatureError::UnsupportedImageUrl(_))
        ));
    }
}
