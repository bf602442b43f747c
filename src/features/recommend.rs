use crate::backend::BackendClient;
use crate::features::FeatureError;
use crate::features::sun::{TimeOfDay, time_of_day};
use crate::types::{Coordinate, CrowdLevel};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    #[default]
    Clear,
    Cloudy,
    Rainy,
    Sunny,
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Weather::Clear => "clear",
            Weather::Cloudy => "cloudy",
            Weather::Rainy => "rainy",
            Weather::Sunny => "sunny",
        })
    }
}

impl FromStr for Weather {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clear" => Ok(Weather::Clear),
            "cloudy" => Ok(Weather::Cloudy),
            "rainy" => Ok(Weather::Rainy),
            "sunny" => Ok(Weather::Sunny),
            other => Err(format!("unknown weather '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationPreferences {
    pub max_distance: f64,
    pub min_rating: f64,
    pub preferred_vibes: Vec<String>,
}

impl Default for RecommendationPreferences {
    fn default() -> Self {
        Self {
            max_distance: 5.0,
            min_rating: 4.0,
            preferred_vibes: Vec::new(),
        }
    }
}

impl RecommendationPreferences {
    /// Within range, rated high enough and, if vibes are preferred, sharing at least one.
    pub fn accepts(&self, recommendation: &Recommendation) -> bool {
        if recommendation.distance_km > self.max_distance
            || recommendation.rating < self.min_rating
        {
            return false;
        }
        let shares_vibe = |vibe: &String| {
            let vibe = vibe.trim();
            recommendation.vibes.iter().any(|v| v.eq_ignore_ascii_case(vibe))
        };
        self.preferred_vibes.is_empty() || self.preferred_vibes.iter().any(shares_vibe)
    }
}

#[derive(Debug, Clone, PartialEq, Builder)]
pub struct RecommendationRequest {
    pub location: Coordinate,
    #[builder(default)]
    pub weather: Weather,
    /// Computed from the sun position at request time when not given.
    pub time_of_day: Option<TimeOfDay>,
    #[builder(default)]
    pub preferences: RecommendationPreferences,
}

#[derive(Debug, Serialize)]
struct RecommendationBody<'a> {
    latitude: f64,
    longitude: f64,
    weather: Weather,
    time_of_day: TimeOfDay,
    preferences: &'a RecommendationPreferences,
}

impl RecommendationRequest {
    pub fn time_of_day_at(&self, at: DateTime<Utc>) -> Result<TimeOfDay, FeatureError> {
        match self.time_of_day {
            Some(time_of_day) => Ok(time_of_day),
            None => time_of_day(self.location, at),
        }
    }

    fn body(&self, at: DateTime<Utc>) -> Result<RecommendationBody<'_>, FeatureError> {
        self.location.validate()?;
        Ok(RecommendationBody {
            latitude: self.location.lat,
            longitude: self.location.lng,
            weather: self.weather,
            time_of_day: self.time_of_day_at(at)?,
            preferences: &self.preferences,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Normal,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Normal => "normal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Recommendation {
    pub id: i64,
    pub photo_url: String,
    pub place_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vibes: Vec<String>,
    #[serde(default)]
    pub best_time: String,
    #[serde(default)]
    pub crowd_level: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub distance_km: f64,
    #[serde(default)]
    pub priority: Priority,
}

impl Recommendation {
    pub fn crowd(&self) -> CrowdLevel {
        CrowdLevel::from_label(&self.crowd_level)
    }
}

impl BackendClient {
    /// Spots near the request location that suit the weather and light, best first.
    ///
    /// The backend ranks by priority then distance; the result is narrowed by the
    /// request's preferences before returning.
    pub async fn smart_recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<Recommendation>, FeatureError> {
        let body = request.body(Utc::now())?;
        debug!(
            weather = %body.weather,
            time_of_day = %body.time_of_day,
            "Requesting recommendations"
        );

        let recommendations: Vec<Recommendation> =
            self.post_json("smart_recommendations", &body).await?;
        let total = recommendations.len();
        let accepted = filter_recommendations(recommendations, &request.preferences);
        info!(total, accepted = accepted.len(), "Recommendations received");
        Ok(accepted)
    }
}

pub fn filter_recommendations(
    recommendations: Vec<Recommendation>,
    preferences: &RecommendationPreferences,
) -> Vec<Recommendation> {
    recommendations
        .into_iter()
        .filter(|r| preferences.accepts(r))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn recommendation(name: &str, rating: f64, distance_km: f64, vibes: &[&str]) -> Recommendation {
        Recommendation {
            id: 1,
            photo_url: format!("https://example.com/{name}.jpg"),
            place_name: name.to_string(),
            description: String::new(),
            vibes: vibes.iter().map(|v| v.to_string()).collect(),
            best_time: "daylight".to_string(),
            crowd_level: "medium".to_string(),
            rating,
            distance_km,
            priority: Priority::Normal,
        }
    }

    #[test]
    fn test_body_computes_time_of_day_when_missing() {
        let request = RecommendationRequest::builder()
            .location(Coordinate::new(52.379_189, 4.899_431).unwrap())
            .weather(Weather::Sunny)
            .build();
        let noon = Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap();

        let body = serde_json::to_value(request.body(noon).unwrap()).unwrap();

        assert_eq!(body["time_of_day"], "daylight");
        assert_eq!(body["weather"], "sunny");
        assert_eq!(body["latitude"], 52.379_189);
        assert_eq!(body["preferences"]["maxDistance"], 5.0);
        assert_eq!(body["preferences"]["preferredVibes"], json!([]));
    }

    #[test]
    fn test_explicit_time_of_day_wins() {
        let request = RecommendationRequest::builder()
            .location(Coordinate::FALLBACK)
            .time_of_day(TimeOfDay::BlueHour)
            .build();
        let noon = Utc.with_ymd_and_hms(2024, 6, 21, 17, 0, 0).unwrap();
        assert_eq!(request.time_of_day_at(noon).unwrap(), TimeOfDay::BlueHour);
    }

    #[test]
    fn test_invalid_location_is_rejected_locally() {
        let request = RecommendationRequest::builder()
            .location(Coordinate { lat: 120.0, lng: 0.0 })
            .build();
        assert!(matches!(
            request.body(Utc::now()),
            Err(FeatureError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn test_parses_backend_response() {
        let recommendations: Vec<Recommendation> = serde_json::from_value(json!([{
            "id": 7,
            "photo_url": "https://example.com/pier.jpg",
            "place_name": "Pier",
            "description": "Beautiful photo spot with great views",
            "vibes": ["nature", "peaceful"],
            "best_time": "daylight",
            "crowd_level": "medium",
            "rating": 4.5,
            "distance_km": 1.2,
            "priority": "high"
        }]))
        .unwrap();

        assert_eq!(recommendations[0].priority, Priority::High);
        assert_eq!(recommendations[0].crowd(), CrowdLevel::Medium);
    }

    #[test]
    fn test_preferences_filter() {
        let preferences = RecommendationPreferences {
            max_distance: 3.0,
            min_rating: 4.0,
            preferred_vibes: vec!["Urban".to_string()],
        };
        let kept = filter_recommendations(
            vec![
                recommendation("near-urban", 4.5, 1.0, &["urban"]),
                recommendation("far-urban", 4.8, 8.0, &["urban"]),
                recommendation("low-rated", 3.0, 1.0, &["urban"]),
                recommendation("nature", 4.9, 1.0, &["nature"]),
            ],
            &preferences,
        );

        let names: Vec<&str> = kept.iter().map(|r| r.place_name.as_str()).collect();
        assert_eq!(names, vec!["near-urban"]);
    }
}
