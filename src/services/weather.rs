//! Weather retrieval with cache-aside.
//!
//! Read the cache, fall back to the provider on a miss, then write the fresh
//! snapshot back. Cache failures only cost a provider round-trip; the only
//! error a caller sees is the provider's.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::WeatherError;
use crate::services::cache::WeatherCache;
use crate::services::snapshot::{Coordinate, WeatherSnapshot};

/// How long a fetched snapshot stays in the cache.
pub const CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Source of truth for weather at a coordinate.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch_weather(&self, coord: Coordinate) -> Result<WeatherSnapshot, WeatherError>;
}

#[derive(Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    cache: WeatherCache,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>, cache: WeatherCache) -> Self {
        Self { provider, cache }
    }

    /// Get weather for a coordinate, from cache when possible.
    ///
    /// Concurrent misses for the same coordinate each go to the provider and
    /// each overwrite the cache entry.
    pub async fn get_weather(&self, coord: Coordinate) -> Result<WeatherSnapshot, WeatherError> {
        match self.cache.get(coord).await {
            Ok(Some(snapshot)) => {
                tracing::debug!("Weather cache hit for ({}, {})", coord.lat, coord.lon);
                return Ok(snapshot);
            }
            Ok(None) => {
                tracing::debug!("Weather cache miss for ({}, {})", coord.lat, coord.lon);
            }
            Err(e) => {
                tracing::warn!(
                    "Weather cache read failed for ({}, {}), fetching from provider: {}",
                    coord.lat,
                    coord.lon,
                    e
                );
            }
        }

        let snapshot = self.provider.fetch_weather(coord).await?;

        if let Err(e) = self.cache.put(coord, &snapshot, CACHE_TTL).await {
            tracing::warn!(
                "Weather cache write failed for ({}, {}): {}",
                coord.lat,
                coord.lon,
                e
            );
        }

        Ok(snapshot)
    }
}
