use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Standard error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

/// Failure to obtain weather from the provider.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("provider returned HTTP {status}")]
    UpstreamStatus { status: u16 },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("client configuration error: {0}")]
    Config(String),
}

/// Failure of the cache backing store. Never surfaced to API callers.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cache operation timed out after {0} ms")]
    Timeout(u128),

    #[error("malformed cached payload: {0}")]
    Decode(String),

    #[error("failed to encode snapshot: {0}")]
    Encode(String),
}

impl From<sqlx::Error> for CacheError {
    fn from(err: sqlx::Error) -> Self {
        CacheError::Backend(err.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Weather unavailable: {0}")]
    WeatherUnavailable(#[from] WeatherError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::WeatherUnavailable(err) => {
                tracing::error!("Weather unavailable: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "weather data unavailable".to_string(),
                )
            }
            AppError::DatabaseError(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal database error".to_string(),
                )
            }
        };

        (status, axum::Json(ErrorResponse { error: message })).into_response()
    }
}
