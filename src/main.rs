use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use snapsphere::features::captions::{CaptionMood, CaptionStyle};
use snapsphere::features::recommend::{RecommendationPreferences, RecommendationRequest, Weather};
use snapsphere::features::submit::SpotSubmission;
use snapsphere::features::sun::TimeOfDay;
use snapsphere::features::vibes::VIBE_CATALOG;
use snapsphere::location::{
    FixedPosition, GeolocationProvider, LocationResolver, LocationSource, NoGeolocation,
    NominatimGeocoder,
};
use snapsphere::types::Coordinate;
use snapsphere::{BackendClient, DedupedPlace, Resolution, SnapSphereConfig, SpotExplorer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Discover photogenic spots near you.
#[derive(Parser, Debug)]
#[command(name = "snapsphere")]
#[command(version)]
struct Cli {
    /// TOML config file
    #[arg(long, global = true, env = "SNAPSPHERE_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides the backend URL from the config file and environment
    #[arg(long, global = true)]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find spots around a location
    Spots {
        #[command(flatten)]
        location: LocationArgs,

        /// Only show places with this vibe. Repeat to require several.
        #[arg(long = "vibe")]
        vibes: Vec<String>,

        /// Show the best-rated places only
        #[arg(long)]
        trending: bool,

        /// Print the full view snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Geocode a place name or "lat, lng" text
    Search { query: String },
    /// List the vibes available as filters
    Vibes,
    /// Ask the backend which vibes an image has
    Classify {
        image_url: String,

        /// Full analysis with confidence, palette and style tags
        #[arg(long)]
        detailed: bool,
    },
    /// Generate a caption and hashtags for an image
    Caption {
        image_url: String,

        #[arg(long, default_value = "casual")]
        style: CaptionStyle,

        #[arg(long, default_value = "happy")]
        mood: CaptionMood,
    },
    /// Spots that suit the current weather and light
    Recommend {
        #[command(flatten)]
        location: LocationArgs,

        #[arg(long, default_value = "clear")]
        weather: Weather,

        /// night, blue_hour, golden_hour or daylight. Computed from the sun when omitted.
        #[arg(long)]
        time_of_day: Option<TimeOfDay>,

        #[arg(long, default_value_t = 5.0)]
        max_distance: f64,

        #[arg(long, default_value_t = 4.0)]
        min_rating: f64,

        #[arg(long = "vibe")]
        vibes: Vec<String>,
    },
    /// Share a spot with everyone
    Submit {
        photo_url: String,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// When the photo was taken, RFC 3339
        #[arg(long)]
        taken_at: Option<DateTime<Utc>>,
    },
}

#[derive(Args, Debug)]
struct LocationArgs {
    /// Latitude of the device position
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude of the device position
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lng: Option<f64>,

    /// Place name or "lat, lng" to search around instead
    #[arg(long, conflicts_with_all = ["lat", "lng"])]
    near: Option<String>,
}

struct App {
    config: SnapSphereConfig,
    client: Arc<BackendClient>,
}

impl App {
    fn new(cli: &Cli) -> Result<Self> {
        let mut config = SnapSphereConfig::load(cli.config.as_deref())
            .context("Failed to load configuration")?;
        if let Some(url) = &cli.backend_url {
            config.backend.base_url = url.clone();
        }
        let client = Arc::new(BackendClient::new(&config.backend)?);
        info!(backend = %client.base_url(), "Using backend");
        Ok(Self { config, client })
    }

    fn resolver(&self, location: &LocationArgs) -> Result<LocationResolver> {
        let geolocation: Arc<dyn GeolocationProvider> = match (location.lat, location.lng) {
            (Some(lat), Some(lng)) => Arc::new(FixedPosition(Coordinate::new(lat, lng)?)),
            _ => Arc::new(NoGeolocation),
        };
        let geocoder =
            NominatimGeocoder::new(&self.config.geocoder, &self.config.backend.user_agent)?;
        Ok(LocationResolver::from_config(
            &self.config.location,
            geolocation,
            Arc::new(geocoder),
        ))
    }

    async fn resolve(&self, location: &LocationArgs) -> Result<Resolution> {
        let resolver = self.resolver(location)?;
        let resolution = match &location.near {
            Some(query) => resolver.search(query).await?,
            None => resolver.locate().await,
        };
        if let LocationSource::Fallback { reason } = &resolution.source {
            eprintln!("{reason}. Using {}.", resolution.coordinate);
        }
        Ok(resolution)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snapsphere=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Vibes => {
            for vibe in VIBE_CATALOG {
                println!("{} {:<10} {}", vibe.icon, vibe.id, vibe.label);
            }
        }
        Command::Search { query } => {
            let app = App::new(&cli)?;
            let location = LocationArgs {
                lat: None,
                lng: None,
                near: Some(query.clone()),
            };
            let resolution = app.resolve(&location).await?;
            println!("{}  {}", resolution.coordinate, resolution.describe());
        }
        Command::Spots {
            location,
            vibes,
            trending,
            json,
        } => {
            let app = App::new(&cli)?;
            let resolution = app.resolve(location).await?;
            let explorer =
                SpotExplorer::from_config(&app.config, app.client.clone(), app.client.clone());
            for vibe in vibes {
                explorer.select_vibe(vibe);
            }
            explorer
                .apply_resolution(&resolution)
                .await
                .context("Failed to load spots")?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&explorer.snapshot())?);
            } else {
                let places = if *trending {
                    explorer.trending(None)
                } else {
                    explorer.places()
                };
                print_places(&resolution, &places);
            }
        }
        Command::Classify {
            image_url,
            detailed,
        } => {
            let app = App::new(&cli)?;
            if *detailed {
                let analysis = app.client.analyze_vibe(image_url).await?;
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                println!("{}", app.client.classify(image_url).await?.join(", "));
            }
        }
        Command::Caption {
            image_url,
            style,
            mood,
        } => {
            let app = App::new(&cli)?;
            let caption = app.client.generate_caption(image_url, *style, *mood).await?;
            println!("{}", caption.share_text());
        }
        Command::Recommend {
            location,
            weather,
            time_of_day,
            max_distance,
            min_rating,
            vibes,
        } => {
            let app = App::new(&cli)?;
            let resolution = app.resolve(location).await?;
            let request = RecommendationRequest::builder()
                .location(resolution.coordinate)
                .weather(*weather)
                .maybe_time_of_day(*time_of_day)
                .preferences(RecommendationPreferences {
                    max_distance: *max_distance,
                    min_rating: *min_rating,
                    preferred_vibes: vibes.clone(),
                })
                .build();
            let recommendations = app.client.smart_recommendations(&request).await?;
            if recommendations.is_empty() {
                println!("No recommendations near {}.", resolution.describe());
            }
            for r in recommendations {
                println!(
                    "{:<6} {:>5.1} km  {:.1}★  {}  [{}]",
                    r.priority.as_str(),
                    r.distance_km,
                    r.rating,
                    r.place_name,
                    r.vibes.join(", ")
                );
            }
        }
        Command::Submit {
            photo_url,
            lat,
            lng,
            taken_at,
        } => {
            let app = App::new(&cli)?;
            let location = Coordinate::new(*lat, *lng)?;
            let mut submission = SpotSubmission::new(photo_url.clone(), location);
            if let Some(taken_at) = taken_at {
                submission = submission.taken_at(*taken_at);
            }
            let receipt = app.client.submit_spot(&submission).await?;
            println!(
                "{}: {} [{}]",
                receipt.message,
                receipt.place_name.as_deref().unwrap_or("Unknown Place"),
                receipt.tags.join(", ")
            );
        }
    }

    Ok(())
}

fn print_places(resolution: &Resolution, places: &[DedupedPlace]) {
    if places.is_empty() {
        println!("No spots found near {}.", resolution.describe());
        return;
    }
    println!("Spots near {}:", resolution.describe());
    for (i, place) in places.iter().enumerate() {
        let photo = &place.photo;
        let distance = resolution.coordinate.distance_km(&photo.coordinate());
        println!(
            "{:>3}. {:<32} {:.1}★ {:>5.2} km  crowd: {:<6} [{}]",
            i + 1,
            photo.place_name,
            photo.rating,
            distance,
            photo.crowd_level.as_str(),
            photo.vibes.join(", ")
        );
    }
}
