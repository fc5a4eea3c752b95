//! Map embed configuration.
//!
//! GET /api/v1/maps/config: keys the frontend needs to render weather maps.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Map configuration shared with the maps handler.
#[derive(Debug, Clone)]
pub struct MapsState {
    pub windy_api_key: String,
}

/// Map embed configuration.
#[derive(Debug, Serialize, ToSchema)]
pub struct MapsConfigResponse {
    /// Windy map API key
    pub windy_api_key: String,
}

/// Get map embed configuration.
#[utoipa::path(
    get,
    path = "/api/v1/maps/config",
    tag = "Maps",
    responses(
        (status = 200, description = "Map configuration", body = MapsConfigResponse),
    )
)]
pub async fn get_maps_config(State(state): State<MapsState>) -> Json<MapsConfigResponse> {
    Json(MapsConfigResponse {
        windy_api_key: state.windy_api_key,
    })
}
