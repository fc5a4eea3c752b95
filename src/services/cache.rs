//! Weather snapshot cache.
//!
//! `WeatherCache` turns coordinates into keys and snapshots into JSON; the
//! bytes live in a pluggable [`CacheStore`]:
//! - [`PgCacheStore`]: `weather_cache` table, shared across instances
//! - [`MemoryCacheStore`]: in-process moka cache with per-entry expiry
//!
//! Every store call is bounded by a deadline. A miss is `Ok(None)`; errors are
//! reserved for an unavailable or misbehaving store.

use async_trait::async_trait;
use chrono::Utc;
use moka::future::Cache;
use moka::Expiry;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::db::queries;
use crate::errors::CacheError;
use crate::services::snapshot::{Coordinate, WeatherSnapshot};

/// Upper bound on entries held by the in-memory store.
const MEMORY_CACHE_MAX_ENTRIES: u64 = 10_000;

/// How often expired rows are deleted from `weather_cache`.
const PURGE_INTERVAL_SECS: u64 = 600;

/// Key-value store with per-entry expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a live (non-expired) value.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value that expires after `ttl`, replacing any previous value.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
}

/// Cache key for a coordinate.
///
/// Uses the shortest exact decimal form of each f64, with no rounding:
/// `-23.55` and `-23.550001` are different keys even though they are a few
/// centimetres apart.
pub fn cache_key(coord: Coordinate) -> String {
    format!("weather:{}:{}", coord.lat, coord.lon)
}

/// Snapshot cache over a [`CacheStore`].
#[derive(Clone)]
pub struct WeatherCache {
    store: Arc<dyn CacheStore>,
    op_timeout: Duration,
}

impl WeatherCache {
    pub fn new(store: Arc<dyn CacheStore>, op_timeout: Duration) -> Self {
        Self { store, op_timeout }
    }

    pub async fn get(&self, coord: Coordinate) -> Result<Option<WeatherSnapshot>, CacheError> {
        let key = cache_key(coord);
        let payload = tokio::time::timeout(self.op_timeout, self.store.get(&key))
            .await
            .map_err(|_| CacheError::Timeout(self.op_timeout.as_millis()))??;

        match payload {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| CacheError::Decode(format!("{}: {}", key, e))),
            None => Ok(None),
        }
    }

    pub async fn put(
        &self,
        coord: Coordinate,
        snapshot: &WeatherSnapshot,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let key = cache_key(coord);
        let json = serde_json::to_string(snapshot).map_err(|e| CacheError::Encode(e.to_string()))?;

        tokio::time::timeout(self.op_timeout, self.store.set(&key, json, ttl))
            .await
            .map_err(|_| CacheError::Timeout(self.op_timeout.as_millis()))?
    }
}

// ---------------------------------------------------------------------------
// Postgres store
// ---------------------------------------------------------------------------

/// Cache rows in the `weather_cache` table.
#[derive(Debug, Clone)]
pub struct PgCacheStore {
    pool: PgPool,
}

impl PgCacheStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Periodically delete expired rows. Expired rows are never served, this
    /// only keeps the table small.
    pub async fn run_purge_loop(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(PURGE_INTERVAL_SECS));
        loop {
            interval.tick().await;
            match queries::purge_expired_cache(&self.pool, Utc::now()).await {
                Ok(0) => {}
                Ok(n) => tracing::debug!("Purged {} expired weather cache rows", n),
                Err(e) => tracing::warn!("Failed to purge weather cache: {}", e),
            }
        }
    }
}

#[async_trait]
impl CacheStore for PgCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(queries::get_cached_payload(&self.pool, key, Utc::now()).await?)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| CacheError::Backend(format!("invalid TTL: {}", e)))?;
        queries::upsert_cached_payload(&self.pool, key, &value, Utc::now() + ttl).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct MemoryEntry {
    payload: String,
    ttl: Duration,
}

/// Expire each entry after the TTL it was stored with.
struct EntryTtl;

impl Expiry<String, MemoryEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &MemoryEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &MemoryEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Process-local store for single-instance deployments and tests.
#[derive(Clone)]
pub struct MemoryCacheStore {
    entries: Cache<String, MemoryEntry>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(MEMORY_CACHE_MAX_ENTRIES)
                .expire_after(EntryTtl)
                .build(),
        }
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(key).await.map(|e| e.payload))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.entries
            .insert(
                key.to_string(),
                MemoryEntry {
                    payload: value,
                    ttl,
                },
            )
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::snapshot::{
        CurrentWeather, DailyForecast, DailyTemperature, HourlyForecast, WeatherCondition,
    };
    use tokio_test::{assert_err, assert_ok};

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            lat: -23.5505,
            lon: -46.6333,
            timezone: "São Paulo".to_string(),
            timezone_offset: -10800,
            current: CurrentWeather {
                dt: 1772370000,
                sunrise: 1772354400,
                sunset: 1772399400,
                temp: 22.4,
                feels_like: 22.1,
                pressure: 1016,
                humidity: 64,
                visibility: 10000,
                wind_speed: 3.6,
                wind_deg: 140,
                clouds: 75,
                weather: vec![WeatherCondition {
                    id: 803,
                    main: "Clouds".to_string(),
                    description: "nublado".to_string(),
                    icon: "04d".to_string(),
                }],
                ..Default::default()
            },
            hourly: vec![HourlyForecast {
                dt: 1772377200,
                // Needs more than 15 significant digits to survive a round trip
                temp: 0.1 + 0.2,
                pop: 0.37,
                wind_gust: 7.3,
                ..Default::default()
            }],
            daily: vec![DailyForecast {
                dt: 1772377200,
                summary: "chuva leve".to_string(),
                temp: DailyTemperature {
                    day: 21.7,
                    min: 18.04,
                    max: 26.19,
                    ..Default::default()
                },
                pop: 0.92,
                ..Default::default()
            }],
        }
    }

    fn memory_cache() -> WeatherCache {
        WeatherCache::new(Arc::new(MemoryCacheStore::new()), Duration::from_secs(1))
    }

    /// Store whose every operation fails.
    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Backend("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection refused".to_string()))
        }
    }

    /// Store that never answers within any reasonable deadline.
    struct HangingStore;

    #[async_trait]
    impl CacheStore for HangingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    #[test]
    fn test_cache_key_uses_exact_representation() {
        assert_eq!(
            cache_key(Coordinate::new(-23.5505, -46.6333)),
            "weather:-23.5505:-46.6333"
        );
        assert_eq!(cache_key(Coordinate::new(10.0, 0.5)), "weather:10:0.5");
    }

    #[test]
    fn test_cache_key_never_uses_exponent() {
        assert_eq!(cache_key(Coordinate::new(1e-7, 0.0)), "weather:0.0000001:0");
    }

    #[test]
    fn test_cache_key_no_rounding() {
        // Geographically identical to within centimetres, still separate keys
        assert_ne!(
            cache_key(Coordinate::new(51.5, -0.12)),
            cache_key(Coordinate::new(51.500001, -0.12))
        );
        assert_eq!(
            cache_key(Coordinate::new(51.5, -0.12)),
            cache_key(Coordinate::new(51.50, -0.120))
        );
    }

    #[tokio::test]
    async fn test_round_trip_is_exact() {
        let cache = memory_cache();
        let coord = Coordinate::new(-23.5505, -46.6333);
        let original = snapshot();

        assert_ok!(cache.put(coord, &original, Duration::from_secs(1800)).await);
        let restored = cache.get(coord).await.unwrap().expect("cached snapshot");
        assert_eq!(restored, original);
        assert_eq!(restored.hourly[0].temp.to_bits(), (0.1_f64 + 0.2).to_bits());
    }

    #[tokio::test]
    async fn test_absent_key_is_a_miss_not_an_error() {
        let cache = memory_cache();
        let result = cache.get(Coordinate::new(1.0, 2.0)).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_different_representation_is_a_miss() {
        let cache = memory_cache();
        assert_ok!(
            cache
                .put(Coordinate::new(51.5, -0.12), &snapshot(), Duration::from_secs(60))
                .await
        );
        let hit = cache.get(Coordinate::new(51.5, -0.12)).await.unwrap();
        let miss = cache.get(Coordinate::new(51.5001, -0.12)).await.unwrap();
        assert!(hit.is_some());
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = memory_cache();
        let coord = Coordinate::new(40.4168, -3.7038);
        assert_ok!(cache.put(coord, &snapshot(), Duration::from_millis(100)).await);
        assert!(cache.get(coord).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(cache.get(coord).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_and_refreshes_ttl() {
        let cache = memory_cache();
        let coord = Coordinate::new(40.4168, -3.7038);
        let mut second = snapshot();
        second.timezone = "Madrid".to_string();

        assert_ok!(cache.put(coord, &snapshot(), Duration::from_millis(100)).await);
        assert_ok!(cache.put(coord, &second, Duration::from_secs(60)).await);
        tokio::time::sleep(Duration::from_millis(300)).await;

        let cached = cache.get(coord).await.unwrap().expect("refreshed entry");
        assert_eq!(cached.timezone, "Madrid");
    }

    #[tokio::test]
    async fn test_malformed_payload_is_decode_error() {
        let store = Arc::new(MemoryCacheStore::new());
        let coord = Coordinate::new(1.0, 1.0);
        store
            .set(&cache_key(coord), "{not json".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        let cache = WeatherCache::new(store, Duration::from_secs(1));
        let err = cache.get(coord).await.unwrap_err();
        assert!(matches!(err, CacheError::Decode(_)));
    }

    #[tokio::test]
    async fn test_backend_errors_surface_from_cache() {
        let cache = WeatherCache::new(Arc::new(BrokenStore), Duration::from_secs(1));
        let coord = Coordinate::new(1.0, 1.0);
        assert_err!(cache.get(coord).await);
        assert_err!(cache.put(coord, &snapshot(), Duration::from_secs(60)).await);
    }

    #[tokio::test]
    async fn test_slow_store_times_out() {
        let cache = WeatherCache::new(Arc::new(HangingStore), Duration::from_millis(50));
        let coord = Coordinate::new(1.0, 1.0);

        let err = cache.get(coord).await.unwrap_err();
        assert!(matches!(err, CacheError::Timeout(50)));

        let err = cache
            .put(coord, &snapshot(), Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Timeout(50)));
    }
}
