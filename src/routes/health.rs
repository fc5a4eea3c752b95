use axum::extract::State;
use axum::Json;
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::config::CacheBackend;

/// State for the health endpoint.
#[derive(Clone)]
pub struct HealthState {
    pub pool: PgPool,
    pub cache_backend: CacheBackend,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status ("ok" when healthy, "degraded" when DB is unreachable)
    pub status: String,
    /// API version
    pub version: String,
    /// Whether the database is reachable
    pub database: bool,
    /// Weather cache backend ("postgres" or "memory")
    pub cache: String,
}

fn cache_label(backend: CacheBackend) -> &'static str {
    match backend {
        CacheBackend::Postgres => "postgres",
        CacheBackend::Memory => "memory",
    }
}

/// Health check endpoint.
///
/// Returns "degraded" (still 200) when the DB is unreachable. Weather requests
/// keep working in that state as long as the provider answers, since cache
/// failures fall back to a live fetch.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service status", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> Json<HealthResponse> {
    let db_ok = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .is_ok();

    Json(HealthResponse {
        status: if db_ok { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_ok,
        cache: cache_label(state.cache_backend).to_string(),
    })
}
