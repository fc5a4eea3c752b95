use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Notification preferences for a user.
/// Alert coordinates are NUMERIC columns to keep full precision.
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)] // updated_at populated by FromRow; not part of the API response
pub struct NotificationSettings {
    pub user_id: Uuid,
    pub is_enabled: bool,
    pub status_bar_notification: bool,
    pub rain_alert: bool,
    pub severe_weather_alert: bool,
    pub alert_location_name: String,
    pub alert_lat: Decimal,
    pub alert_lon: Decimal,
    pub updated_at: DateTime<Utc>,
}
