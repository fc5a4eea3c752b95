use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::NotificationSettings;

/// Parameters for inserting or replacing a user's notification settings.
pub struct UpsertNotificationSettingsParams {
    pub user_id: Uuid,
    pub is_enabled: bool,
    pub status_bar_notification: bool,
    pub rain_alert: bool,
    pub severe_weather_alert: bool,
    pub alert_location_name: String,
    pub alert_lat: Decimal,
    pub alert_lon: Decimal,
}

// ---------------------------------------------------------------------------
// weather_cache
// ---------------------------------------------------------------------------

/// Get a cached payload by key, only if it has not expired as of `now`.
pub async fn get_cached_payload(
    pool: &PgPool,
    key: &str,
    now: DateTime<Utc>,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT payload FROM weather_cache WHERE key = $1 AND expires_at > $2",
    )
    .bind(key)
    .bind(now)
    .fetch_optional(pool)
    .await
}

/// Insert or replace a cached payload.
pub async fn upsert_cached_payload(
    pool: &PgPool,
    key: &str,
    payload: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO weather_cache (key, payload, expires_at, updated_at)
         VALUES ($1, $2, $3, NOW())
         ON CONFLICT (key) DO UPDATE SET
            payload = EXCLUDED.payload,
            expires_at = EXCLUDED.expires_at,
            updated_at = NOW()",
    )
    .bind(key)
    .bind(payload)
    .bind(expires_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete rows that expired before `now`. Returns the number of rows removed.
pub async fn purge_expired_cache(pool: &PgPool, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM weather_cache WHERE expires_at <= $1")
        .bind(now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// notification_settings
// ---------------------------------------------------------------------------

/// Get notification settings for a user.
pub async fn get_notification_settings(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<NotificationSettings>, sqlx::Error> {
    sqlx::query_as::<_, NotificationSettings>(
        "SELECT user_id, is_enabled, status_bar_notification, rain_alert, severe_weather_alert,
                alert_location_name, alert_lat, alert_lon, updated_at
         FROM notification_settings
         WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Insert or replace a user's notification settings.
pub async fn upsert_notification_settings(
    pool: &PgPool,
    params: &UpsertNotificationSettingsParams,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO notification_settings (
            user_id, is_enabled, status_bar_notification, rain_alert, severe_weather_alert,
            alert_location_name, alert_lat, alert_lon, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
        ON CONFLICT (user_id) DO UPDATE SET
            is_enabled = EXCLUDED.is_enabled,
            status_bar_notification = EXCLUDED.status_bar_notification,
            rain_alert = EXCLUDED.rain_alert,
            severe_weather_alert = EXCLUDED.severe_weather_alert,
            alert_location_name = EXCLUDED.alert_location_name,
            alert_lat = EXCLUDED.alert_lat,
            alert_lon = EXCLUDED.alert_lon,
            updated_at = NOW()",
    )
    .bind(params.user_id)
    .bind(params.is_enabled)
    .bind(params.status_bar_notification)
    .bind(params.rain_alert)
    .bind(params.severe_weather_alert)
    .bind(&params.alert_location_name)
    .bind(params.alert_lat)
    .bind(params.alert_lon)
    .execute(pool)
    .await?;
    Ok(())
}
