//! Weather HTTP endpoint.
//!
//! - GET /api/v1/weather?lat=F64&lon=F64

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::{AppError, ErrorResponse};
use crate::helpers::validate_coordinate;
use crate::services::snapshot::{Coordinate, WeatherSnapshot};
use crate::services::weather::WeatherService;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct WeatherQuery {
    /// Latitude in decimal degrees (e.g. -23.5505)
    pub lat: Option<String>,
    /// Longitude in decimal degrees (e.g. -46.6333)
    pub lon: Option<String>,
}

/// Parse and range-check the query coordinate.
///
/// Values are parsed exactly as given; the cache key depends on that.
pub(crate) fn parse_coordinate(query: &WeatherQuery) -> Result<Coordinate, AppError> {
    let (lat, lon) = match (non_empty(&query.lat), non_empty(&query.lon)) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            return Err(AppError::BadRequest(
                "lat and lon query parameters are required".to_string(),
            ))
        }
    };

    let lat: f64 = lat
        .parse()
        .map_err(|_| AppError::BadRequest("invalid lat parameter".to_string()))?;
    let lon: f64 = lon
        .parse()
        .map_err(|_| AppError::BadRequest("invalid lon parameter".to_string()))?;

    validate_coordinate(lat, lon)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Get current, hourly and daily weather for a coordinate.
///
/// Served from cache when a snapshot for the exact coordinate is less than
/// 30 minutes old. `hourly` and `daily` are empty (not null) when the
/// provider's forecast is unavailable.
#[utoipa::path(
    get,
    path = "/api/v1/weather",
    tag = "Weather",
    params(WeatherQuery),
    responses(
        (status = 200, description = "Weather snapshot for the coordinate", body = WeatherSnapshot),
        (status = 400, description = "Missing, malformed or out-of-range coordinate", body = ErrorResponse),
        (status = 500, description = "Weather data unavailable", body = ErrorResponse),
    )
)]
pub async fn get_weather(
    State(service): State<WeatherService>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherSnapshot>, AppError> {
    let coord = parse_coordinate(&query)?;
    let snapshot = service.get_weather(coord).await?;
    Ok(Json(snapshot))
}
