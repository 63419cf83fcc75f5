use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    /// Whether the content-fetch collaborator is configured. The front
    /// end disables the auto-import button when it is not.
    fetcher: bool,
    /// Whether the AI fallback is configured.
    completion: bool,
}

/// Health check endpoint.
///
/// Always 200: missing collaborator credentials degrade extraction
/// quality, they do not make the service unhealthy.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        fetcher: state.pipeline.has_fetcher(),
        completion: state.pipeline.has_completion(),
    })
}
