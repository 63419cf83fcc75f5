//! HTTP front door for the listing extraction pipeline.

pub mod app;
pub mod routes;

pub use app::{build_app, AppState};
