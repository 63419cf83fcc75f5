//! Typed errors for the extraction pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.
//!
//! Only [`ExtractError::InvalidUrl`] is a hard, caller-fault error.
//! Everything else is absorbed by the orchestrator and degrades into a
//! soft-failure response (the consuming UI always has manual entry as a
//! fallback).

use thiserror::Error;

/// Errors that can occur while running the extraction pipeline.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Missing or malformed input URL. The only hard error in the pipeline.
    #[error("invalid URL: {reason}")]
    InvalidUrl { reason: String },

    /// Content-fetch collaborator failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Completion collaborator failed
    #[error("completion failed: {0}")]
    Completion(#[from] CompletionError),
}

/// Errors from the content-fetch service boundary.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No credential configured for the fetch service
    #[error("fetch service credential not configured")]
    MissingCredential,

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Fetch service reported a non-success result
    #[error("fetch service error: {message}")]
    Upstream { message: String },

    /// Fetch timed out
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Fetch succeeded but the document carried no usable content
    #[error("empty document for: {url}")]
    EmptyDocument { url: String },
}

/// Errors from the hosted completion endpoint.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// No credential configured for the completion endpoint
    #[error("completion credential not configured")]
    MissingCredential,

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Endpoint returned a non-2xx status
    #[error("completion API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Reply carried no choices / no content
    #[error("empty completion reply")]
    EmptyReply,
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for completion operations.
pub type CompletionResult<T> = std::result::Result<T, CompletionError>;
