use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub worker: &'static str,
    pub version: &'static str,
    pub separation_backend: &'static str,
    /// True when stems are simulated rather than produced by a model.
    pub simulated: bool,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend = state.dispatcher.engine().backend();
    Json(HealthResponse {
        status: "online",
        worker: "audio-worker",
        version: env!("CARGO_PKG_VERSION"),
        separation_backend: backend.name(),
        simulated: backend.is_simulated(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
