//! Read-only HTTP surface over the video store.

pub mod query;
pub mod rest;

use std::sync::Arc;

use axum::{routing::get, Router};

use query::QueryService;

pub struct AppState {
    pub query: QueryService,
}

/// Routes without middleware. `main` layers CORS and tracing on top.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        .route("/api/v1/getVideos", get(rest::api_get_videos))
        .route("/api/v1/videos/search", get(rest::api_search_videos))
        .route("/api/v2/videos/search", get(rest::api_search_videos_fulltext))
        .with_state(state)
}
