// Weather API v0.1
use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod db;
mod errors;
mod helpers;
mod routes;
mod services;

use config::{AppConfig, CacheBackend};
use routes::health::HealthState;
use routes::maps::MapsState;
use services::cache::{CacheStore, MemoryCacheStore, PgCacheStore, WeatherCache};
use services::openweather::OpenWeatherClient;
use services::weather::WeatherService;

/// Maximum number of connections in the database pool.
const DB_POOL_MAX_CONNECTIONS: u32 = 10;
/// Minimum number of connections kept alive in the database pool.
const DB_POOL_MIN_CONNECTIONS: u32 = 2;

/// Weather API: OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weather API",
        version = "0.1.0",
        description = "Weather aggregation API. Fetches current conditions and the \
            5-day / 3-hour forecast from OpenWeatherMap for a coordinate, derives \
            hourly and daily summaries, and caches the combined snapshot for 30 minutes.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Weather", description = "Current conditions and forecasts"),
        (name = "Notifications", description = "Notification preferences"),
        (name = "Maps", description = "Weather map configuration"),
    ),
    paths(
        routes::health::health_check,
        routes::weather::get_weather,
        routes::notifications::get_notification_settings,
        routes::notifications::update_notification_settings,
        routes::maps::get_maps_config,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            services::snapshot::WeatherSnapshot,
            services::snapshot::CurrentWeather,
            services::snapshot::HourlyForecast,
            services::snapshot::DailyForecast,
            services::snapshot::DailyTemperature,
            services::snapshot::DailyFeelsLike,
            services::snapshot::WeatherCondition,
            routes::notifications::NotificationSettingsResponse,
            routes::notifications::UpdateNotificationSettingsRequest,
            routes::maps::MapsConfigResponse,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // Set up database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(DB_POOL_MAX_CONNECTIONS)
        .min_connections(DB_POOL_MIN_CONNECTIONS)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Pick the cache backing store; the Postgres one also gets a purge task
    let store: Arc<dyn CacheStore> = match config.cache_backend {
        CacheBackend::Postgres => {
            tokio::spawn(PgCacheStore::new(pool.clone()).run_purge_loop());
            Arc::new(PgCacheStore::new(pool.clone()))
        }
        CacheBackend::Memory => Arc::new(MemoryCacheStore::new()),
    };
    tracing::info!("Weather cache backend: {:?}", config.cache_backend);

    // Create OpenWeatherMap client
    let provider = OpenWeatherClient::new(
        &config.openweathermap_base_url,
        &config.openweathermap_api_key,
        &config.openweathermap_lang,
        config.provider_timeout,
    )
    .expect("Failed to build OpenWeatherMap client");

    let weather_service = WeatherService::new(
        Arc::new(provider),
        WeatherCache::new(store, config.cache_timeout),
    );

    // CORS: GET for reads, PUT for notification settings
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::PUT])
        .allow_headers(Any);

    // Build router
    // Each route group carries only the state its handlers need.
    let weather_routes = Router::new()
        .route("/api/v1/weather", get(routes::weather::get_weather))
        .with_state(weather_service);

    let notification_routes = Router::new()
        .route(
            "/api/v1/notifications/settings",
            get(routes::notifications::get_notification_settings)
                .put(routes::notifications::update_notification_settings),
        )
        .with_state(pool.clone());

    let maps_routes = Router::new()
        .route("/api/v1/maps/config", get(routes::maps::get_maps_config))
        .with_state(MapsState {
            windy_api_key: config.windy_api_key.clone(),
        });

    // Health check uses PgPool to verify DB connectivity
    let health_routes = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .with_state(HealthState {
            pool,
            cache_backend: config.cache_backend,
        });

    let app = Router::new()
        .merge(health_routes)
        .merge(weather_routes)
        .merge(notification_routes)
        .merge(maps_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server terminated unexpectedly");

    tracing::info!("Server stopped");
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
