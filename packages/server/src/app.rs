//! Application state and router construction.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use listing_extraction::ListingPipeline;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Shared state: the pipeline is stateless per request, one instance
/// serves all of them.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ListingPipeline>,
}

/// Build the router with tracing, CORS and an overall request timeout.
///
/// The timeout sits above the pipeline's own fetch budget so a stuck
/// collaborator surfaces as a pipeline fallback, not a severed
/// connection.
pub fn build_app(pipeline: Arc<ListingPipeline>) -> Router {
    let state = AppState { pipeline };

    Router::new()
        .route("/health", get(crate::routes::health::health_handler))
        .route(
            "/api/listings/extract",
            post(crate::routes::extract::extract_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(90)))
        .with_state(state)
}
