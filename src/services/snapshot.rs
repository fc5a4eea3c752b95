//! Normalized weather snapshot returned to API callers and stored in the cache.
//!
//! Field names follow the OpenWeatherMap One Call layout so that clients built
//! against that shape can consume this API unchanged.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Weather condition code as reported by the provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct WeatherCondition {
    /// Provider condition id (e.g. 800 = clear sky)
    pub id: i64,
    /// Condition group ("Rain", "Clouds", ...)
    pub main: String,
    /// Localized description
    pub description: String,
    /// Provider icon code
    pub icon: String,
}

/// Point-in-time conditions at the coordinate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct CurrentWeather {
    /// Observation time (unix seconds)
    pub dt: i64,
    pub sunrise: i64,
    pub sunset: i64,
    pub temp: f64,
    pub feels_like: f64,
    /// Pressure in hPa
    pub pressure: i32,
    /// Relative humidity in %
    pub humidity: i32,
    pub dew_point: f64,
    pub uvi: f64,
    /// Cloud cover in %
    pub clouds: i32,
    /// Visibility in metres
    pub visibility: i32,
    pub wind_speed: f64,
    pub wind_deg: i32,
    pub weather: Vec<WeatherCondition>,
}

/// One 3-hour forecast point.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct HourlyForecast {
    pub dt: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: i32,
    pub humidity: i32,
    pub dew_point: f64,
    pub uvi: f64,
    pub clouds: i32,
    pub visibility: i32,
    pub wind_speed: f64,
    pub wind_deg: i32,
    pub wind_gust: f64,
    pub weather: Vec<WeatherCondition>,
    /// Probability of precipitation, 0..1
    pub pop: f64,
}

/// Temperature envelope of a day.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct DailyTemperature {
    /// Temperature of the representative sample
    pub day: f64,
    pub min: f64,
    pub max: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

/// Feels-like temperatures of a day.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct DailyFeelsLike {
    pub day: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

/// One calendar day aggregated from 3-hour forecast points.
///
/// `sunrise`, `sunset`, `moonrise`, `moonset` and `moon_phase` are always zero:
/// the 3-hour forecast endpoint does not report them per day.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct DailyForecast {
    /// Time of the representative sample
    pub dt: i64,
    pub sunrise: i64,
    pub sunset: i64,
    pub moonrise: i64,
    pub moonset: i64,
    pub moon_phase: f64,
    pub summary: String,
    pub temp: DailyTemperature,
    pub feels_like: DailyFeelsLike,
    pub pressure: i32,
    pub humidity: i32,
    pub dew_point: f64,
    pub wind_speed: f64,
    pub wind_deg: i32,
    pub wind_gust: f64,
    pub weather: Vec<WeatherCondition>,
    pub clouds: i32,
    /// Highest probability of precipitation across the day
    pub pop: f64,
    pub uvi: f64,
}

/// Unified weather result for one coordinate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct WeatherSnapshot {
    pub lat: f64,
    pub lon: f64,
    /// Provider location name (the current-conditions endpoint has no IANA zone)
    pub timezone: String,
    /// Offset from UTC in seconds
    pub timezone_offset: i32,
    pub current: CurrentWeather,
    /// Up to 8 forecast points (~24h), chronological
    pub hourly: Vec<HourlyForecast>,
    /// Up to 6 days, chronological
    pub daily: Vec<DailyForecast>,
}
