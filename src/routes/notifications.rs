//! Notification settings HTTP endpoints.
//!
//! - GET /api/v1/notifications/settings
//! - PUT /api/v1/notifications/settings
//!
//! There is no authentication layer yet, so both operate on the built-in user.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::models::NotificationSettings;
use crate::db::queries::{self, UpsertNotificationSettingsParams};
use crate::errors::{AppError, ErrorResponse};
use crate::helpers::{dec_to_f64, f64_to_decimal_full, validate_coordinate};

/// User every request acts as until authentication exists.
pub const DEFAULT_USER_ID: Uuid = Uuid::from_u128(1);

/// Notification settings as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationSettingsResponse {
    pub user_id: Uuid,
    /// Master switch for all notifications
    pub is_enabled: bool,
    /// Persistent status bar notification with current conditions
    pub status_bar_notification: bool,
    pub rain_alert: bool,
    pub severe_weather_alert: bool,
    /// Display name of the alert location
    pub alert_location_name: String,
    pub alert_lat: f64,
    pub alert_lon: f64,
}

impl From<&NotificationSettings> for NotificationSettingsResponse {
    fn from(s: &NotificationSettings) -> Self {
        Self {
            user_id: s.user_id,
            is_enabled: s.is_enabled,
            status_bar_notification: s.status_bar_notification,
            rain_alert: s.rain_alert,
            severe_weather_alert: s.severe_weather_alert,
            alert_location_name: s.alert_location_name.clone(),
            alert_lat: dec_to_f64(s.alert_lat),
            alert_lon: dec_to_f64(s.alert_lon),
        }
    }
}

/// Request body for updating notification settings. Omitted fields reset to
/// their defaults; any `user_id` in the body is ignored.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateNotificationSettingsRequest {
    pub is_enabled: bool,
    pub status_bar_notification: bool,
    pub rain_alert: bool,
    pub severe_weather_alert: bool,
    pub alert_location_name: String,
    pub alert_lat: f64,
    pub alert_lon: f64,
}

fn upsert_params(
    user_id: Uuid,
    req: UpdateNotificationSettingsRequest,
) -> Result<UpsertNotificationSettingsParams, AppError> {
    let alert = validate_coordinate(req.alert_lat, req.alert_lon)?;
    Ok(UpsertNotificationSettingsParams {
        user_id,
        is_enabled: req.is_enabled,
        status_bar_notification: req.status_bar_notification,
        rain_alert: req.rain_alert,
        severe_weather_alert: req.severe_weather_alert,
        alert_location_name: req.alert_location_name.trim().to_string(),
        alert_lat: f64_to_decimal_full(alert.lat),
        alert_lon: f64_to_decimal_full(alert.lon),
    })
}

/// Get the current user's notification settings.
#[utoipa::path(
    get,
    path = "/api/v1/notifications/settings",
    tag = "Notifications",
    responses(
        (status = 200, description = "Notification settings", body = NotificationSettingsResponse),
        (status = 404, description = "No settings saved yet", body = ErrorResponse),
    )
)]
pub async fn get_notification_settings(
    State(pool): State<PgPool>,
) -> Result<Json<NotificationSettingsResponse>, AppError> {
    let settings = queries::get_notification_settings(&pool, DEFAULT_USER_ID)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Notification settings for user {} not found",
                DEFAULT_USER_ID
            ))
        })?;

    Ok(Json(NotificationSettingsResponse::from(&settings)))
}

/// Create or replace the current user's notification settings.
#[utoipa::path(
    put,
    path = "/api/v1/notifications/settings",
    tag = "Notifications",
    request_body = UpdateNotificationSettingsRequest,
    responses(
        (status = 204, description = "Settings saved"),
        (status = 400, description = "Invalid alert coordinate", body = ErrorResponse),
    )
)]
pub async fn update_notification_settings(
    State(pool): State<PgPool>,
    Json(req): Json<UpdateNotificationSettingsRequest>,
) -> Result<StatusCode, AppError> {
    let params = upsert_params(DEFAULT_USER_ID, req)?;
    queries::upsert_notification_settings(&pool, &params).await?;
    tracing::info!("Updated notification settings for user {}", DEFAULT_USER_ID);
    Ok(StatusCode::NO_CONTENT)
}
