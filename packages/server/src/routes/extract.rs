//! POST /api/listings/extract
//!
//! The only entry point driving the pipeline. Malformed input is the
//! only 4xx; every collaborator failure comes back as HTTP 200 with
//! `fallback: true` so the modal can switch to manual entry instead of
//! showing a server error.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use listing_extraction::{ExtractError, NormalizedComparable, PipelineOutcome};

use crate::app::AppState;

#[derive(Deserialize)]
pub struct ExtractRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<NormalizedComparable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_used: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ExtractResponse {
    fn success(data: NormalizedComparable, ai_used: bool) -> Self {
        Self {
            success: true,
            data: Some(data),
            ai_used: Some(ai_used),
            error: None,
            fallback: None,
            source: None,
        }
    }

    fn soft_failure(error: String, source: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            ai_used: None,
            error: Some(error),
            fallback: Some(true),
            source,
        }
    }

    fn hard_failure(error: String) -> Self {
        Self {
            success: false,
            data: None,
            ai_used: None,
            error: Some(error),
            fallback: None,
            source: None,
        }
    }
}

pub async fn extract_handler(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> (StatusCode, Json<ExtractResponse>) {
    let Some(url) = request.url.filter(|u| !u.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ExtractResponse::hard_failure("URL is required".to_string())),
        );
    };

    match state.pipeline.run(&url).await {
        Ok(PipelineOutcome::Success { data, ai_used }) => {
            (StatusCode::OK, Json(ExtractResponse::success(data, ai_used)))
        }
        Ok(PipelineOutcome::Fallback { error, source }) => (
            StatusCode::OK,
            Json(ExtractResponse::soft_failure(error, source)),
        ),
        Err(ExtractError::InvalidUrl { reason }) => (
            StatusCode::BAD_REQUEST,
            Json(ExtractResponse::hard_failure(reason)),
        ),
        Err(e) => {
            // Unexpected: absorb into the soft-failure shape, never a
            // bodyless 5xx.
            tracing::error!(error = %e, "pipeline returned an unexpected error");
            (
                StatusCode::OK,
                Json(ExtractResponse::soft_failure(e.to_string(), None)),
            )
        }
    }
}
