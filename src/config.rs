use std::time::Duration;

use crate::services::openweather::DEFAULT_BASE_URL;

/// Where weather snapshots are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    /// `weather_cache` table in the application database
    Postgres,
    /// Per-process moka cache
    Memory,
}

impl CacheBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "postgres" | "pg" => Some(CacheBackend::Postgres),
            "memory" | "mem" => Some(CacheBackend::Memory),
            _ => None,
        }
    }
}

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub openweathermap_api_key: String,
    pub openweathermap_base_url: String,
    /// Locale for provider descriptions (e.g. "pt_br").
    pub openweathermap_lang: String,
    /// Transport timeout for each provider call.
    pub provider_timeout: Duration,
    pub cache_backend: CacheBackend,
    /// Deadline for each cache get/put.
    pub cache_timeout: Duration,
    /// Deadline for a whole HTTP request.
    pub request_timeout: Duration,
    /// Key handed to the frontend for the Windy map embed.
    pub windy_api_key: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            openweathermap_api_key: std::env::var("OPENWEATHERMAP_API_KEY")
                .expect("OPENWEATHERMAP_API_KEY must be set"),
            openweathermap_base_url: std::env::var("OPENWEATHERMAP_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            openweathermap_lang: std::env::var("OPENWEATHERMAP_LANG")
                .unwrap_or_else(|_| "pt_br".to_string()),
            provider_timeout: Duration::from_secs(
                std::env::var("PROVIDER_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .expect("PROVIDER_TIMEOUT_SECS must be a valid u64"),
            ),
            cache_backend: std::env::var("CACHE_BACKEND")
                .map(|v| {
                    CacheBackend::parse(&v).expect("CACHE_BACKEND must be 'postgres' or 'memory'")
                })
                .unwrap_or(CacheBackend::Postgres),
            cache_timeout: Duration::from_millis(
                std::env::var("CACHE_TIMEOUT_MS")
                    .unwrap_or_else(|_| "500".to_string())
                    .parse()
                    .expect("CACHE_TIMEOUT_MS must be a valid u64"),
            ),
            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .expect("REQUEST_TIMEOUT_SECS must be a valid u64"),
            ),
            windy_api_key: std::env::var("WINDY_API_KEY").unwrap_or_default(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
        }
    }
}
