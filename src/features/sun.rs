use crate::features::FeatureError;
use crate::types::Coordinate;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use sunrise::{Coordinates, DawnType, SolarDay, SolarEvent};

/// Minutes after sunrise and before sunset that count as golden hour.
const GOLDEN_HOUR_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Night,
    /// Civil twilight, between dawn and sunrise or sunset and dusk.
    BlueHour,
    GoldenHour,
    Daylight,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Night => "night",
            TimeOfDay::BlueHour => "blue_hour",
            TimeOfDay::GoldenHour => "golden_hour",
            TimeOfDay::Daylight => "daylight",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "night" => Ok(TimeOfDay::Night),
            "blue_hour" => Ok(TimeOfDay::BlueHour),
            "golden_hour" => Ok(TimeOfDay::GoldenHour),
            "daylight" => Ok(TimeOfDay::Daylight),
            other => Err(format!("unknown time of day '{other}'")),
        }
    }
}

/// Sun events for the UTC date of the requested instant.
///
/// Events are `None` when they don't happen that day: no sunrise or sunset during polar
/// day and polar night, no civil dawn or dusk when the sun stays within 6° of the horizon.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SunInfo {
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub dawn: Option<DateTime<Utc>>,
    pub dusk: Option<DateTime<Utc>>,
    pub is_daytime: bool,
    pub time_of_day: TimeOfDay,
}

pub fn sun_info(coordinate: Coordinate, at: DateTime<Utc>) -> Result<SunInfo, FeatureError> {
    let coord = Coordinates::new(coordinate.lat, coordinate.lng).ok_or(
        FeatureError::SunCalculation {
            lat: coordinate.lat,
            lng: coordinate.lng,
        },
    )?;
    let date = at.date_naive();

    let sunrise = SolarDay::new(coord, date).event_time(SolarEvent::Sunrise);
    let sunset = SolarDay::new(coord, date).event_time(SolarEvent::Sunset);
    let dawn = SolarDay::new(coord, date).event_time(SolarEvent::Dawn(DawnType::Civil));
    let dusk = SolarDay::new(coord, date).event_time(SolarEvent::Dusk(DawnType::Civil));

    let golden = Duration::minutes(GOLDEN_HOUR_MINUTES);
    let (is_daytime, time_of_day) = match (sunrise, sunset) {
        (Some(rise), Some(set)) if at >= rise && at <= set => {
            let time_of_day = if at < rise + golden || at > set - golden {
                TimeOfDay::GoldenHour
            } else {
                TimeOfDay::Daylight
            };
            (true, time_of_day)
        }
        (Some(_), Some(_)) => {
            // A missing dawn or dusk means the sun never gets below civil twilight.
            let dark = dawn.is_some_and(|dawn| at < dawn) || dusk.is_some_and(|dusk| at > dusk);
            let time_of_day = if dark {
                TimeOfDay::Night
            } else {
                TimeOfDay::BlueHour
            };
            (false, time_of_day)
        }
        _ if noon_elevation(coordinate, date) > 0.0 => (true, TimeOfDay::Daylight),
        _ => {
            let time_of_day = match (dawn, dusk) {
                (Some(dawn), Some(dusk)) if at >= dawn && at <= dusk => TimeOfDay::BlueHour,
                _ => TimeOfDay::Night,
            };
            (false, time_of_day)
        }
    };

    Ok(SunInfo {
        sunrise,
        sunset,
        dawn,
        dusk,
        is_daytime,
        time_of_day,
    })
}

/// Approximate solar elevation at local noon, in degrees. Tells polar day from polar night.
fn noon_elevation(coordinate: Coordinate, date: NaiveDate) -> f64 {
    let day = f64::from(date.ordinal());
    let declination = -23.44 * (2.0 * PI / 365.0 * (day + 10.0)).cos();
    90.0 - (coordinate.lat - declination).abs()
}

pub fn time_of_day(coordinate: Coordinate, at: DateTime<Utc>) -> Result<TimeOfDay, FeatureError> {
    Ok(sun_info(coordinate, at)?.time_of_day)
}
