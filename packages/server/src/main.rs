// Main entry point for the extraction API server

use std::sync::Arc;

use anyhow::{Context, Result};
use listing_extraction::{Credentials, ListingPipeline};
use server_core::build_app;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,listing_extraction=debug,server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting listing extraction API");

    // Missing credentials disable collaborators, they never fail startup.
    let credentials = Credentials::from_env();
    let pipeline = ListingPipeline::from_credentials(&credentials);
    tracing::info!(
        fetcher = pipeline.has_fetcher(),
        completion = pipeline.has_completion(),
        "pipeline configured"
    );

    let app = build_app(Arc::new(pipeline));

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("Listening on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
