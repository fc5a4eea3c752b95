//! OpenWeatherMap 2.5 client.
//!
//! Two endpoints are used per coordinate:
//! - `/weather`: current conditions (required; failure aborts the request)
//! - `/forecast`: 5 days of 3-hour samples (optional; failure leaves hourly/daily empty)
//!
//! See: https://openweathermap.org/current and https://openweathermap.org/forecast5

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::WeatherError;
use crate::services::aggregate::{to_daily, to_hourly};
use crate::services::snapshot::{Coordinate, CurrentWeather, WeatherCondition, WeatherSnapshot};
use crate::services::weather::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

const CURRENT_ENDPOINT: &str = "weather";
const FORECAST_ENDPOINT: &str = "forecast";
const UNITS: &str = "metric";

/// Client for the OpenWeatherMap current-conditions and forecast APIs.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    lang: String,
}

// --- OpenWeatherMap JSON response types ---
//
// Missing fields decode as zero values; only malformed JSON or mismatched
// types are decode errors.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwmCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwmCurrentMain {
    temp: f64,
    feels_like: f64,
    pressure: i32,
    humidity: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwmCurrentWind {
    speed: f64,
    deg: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct OwmClouds {
    pub(crate) all: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwmSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwmCurrentResponse {
    coord: OwmCoord,
    weather: Vec<WeatherCondition>,
    main: OwmCurrentMain,
    visibility: i32,
    wind: OwmCurrentWind,
    clouds: OwmClouds,
    dt: i64,
    sys: OwmSys,
    /// Shift in seconds from UTC
    timezone: i32,
    /// City name
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwmForecastResponse {
    list: Vec<ForecastSample>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SampleMain {
    pub(crate) temp: f64,
    pub(crate) feels_like: f64,
    pub(crate) temp_min: f64,
    pub(crate) temp_max: f64,
    pub(crate) pressure: i32,
    pub(crate) humidity: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SampleWind {
    pub(crate) speed: f64,
    pub(crate) deg: i32,
    pub(crate) gust: f64,
}

/// One entry of the `/forecast` list (a 3-hour step).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ForecastSample {
    pub(crate) dt: i64,
    pub(crate) main: SampleMain,
    pub(crate) weather: Vec<WeatherCondition>,
    pub(crate) clouds: OwmClouds,
    pub(crate) wind: SampleWind,
    pub(crate) pop: f64,
}

impl OpenWeatherClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        lang: &str,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            lang: lang.to_string(),
        })
    }

    /// GET `{base_url}/{endpoint}` for a coordinate and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        coord: Coordinate,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let lat = format!("{:.6}", coord.lat);
        let lon = format!("{:.6}", coord.lon);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", UNITS),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await
            .map_err(|e| request_error(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| request_error(endpoint, e))?;

        serde_json::from_str(&body)
            .map_err(|e| WeatherError::Decode(format!("OpenWeatherMap /{}: {}", endpoint, e)))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch_weather(&self, coord: Coordinate) -> Result<WeatherSnapshot, WeatherError> {
        let current: OwmCurrentResponse = self.get_json(CURRENT_ENDPOINT, coord).await?;
        let mut snapshot = snapshot_from_current(current);

        match self
            .get_json::<OwmForecastResponse>(FORECAST_ENDPOINT, coord)
            .await
        {
            Ok(forecast) => {
                snapshot.hourly = to_hourly(&forecast.list);
                snapshot.daily = to_daily(&forecast.list);
            }
            Err(e) => {
                tracing::warn!(
                    "Forecast unavailable for ({}, {}), returning current conditions only: {}",
                    coord.lat,
                    coord.lon,
                    e
                );
            }
        }

        Ok(snapshot)
    }
}

/// Map a reqwest failure onto the error taxonomy. The URL is stripped since
/// it carries the API key.
fn request_error(endpoint: &str, err: reqwest::Error) -> WeatherError {
    let err = err.without_url();
    if err.is_timeout() {
        WeatherError::Timeout(format!("OpenWeatherMap /{}: {}", endpoint, err))
    } else {
        WeatherError::Transport(format!("OpenWeatherMap /{}: {}", endpoint, err))
    }
}

/// Build a snapshot from current conditions with empty hourly/daily series.
///
/// `timezone` carries the provider's location name: `/weather` has no IANA zone.
fn snapshot_from_current(current: OwmCurrentResponse) -> WeatherSnapshot {
    WeatherSnapshot {
        lat: current.coord.lat,
        lon: current.coord.lon,
        timezone: current.name,
        timezone_offset: current.timezone,
        current: CurrentWeather {
            dt: current.dt,
            sunrise: current.sys.sunrise,
            sunset: current.sys.sunset,
            temp: current.main.temp,
            feels_like: current.main.feels_like,
            pressure: current.main.pressure,
            humidity: current.main.humidity,
            dew_point: 0.0,
            uvi: 0.0,
            clouds: current.clouds.all,
            visibility: current.visibility,
            wind_speed: current.wind.speed,
            wind_deg: current.wind.deg,
            weather: current.weather,
        },
        hourly: Vec::new(),
        daily: Vec::new(),
    }
}
