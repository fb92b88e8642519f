use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use tracing::warn;

use crate::query::{QueryError, SearchMode};
use crate::AppState;

// --- Query structs ---

/// Raw strings so that validation (and its 400s) stays in the query layer.
#[derive(Deserialize)]
pub struct ListQuery {
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

// --- Errors ---

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        match self {
            QueryError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            QueryError::NotFound => {
                (StatusCode::NOT_FOUND, "No videos found".to_string()).into_response()
            }
            QueryError::Storage(e) => {
                warn!(error = %e, "Video query failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error querying the database".to_string(),
                )
                    .into_response()
            }
        }
    }
}

// --- Handlers ---

pub async fn api_get_videos(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> impl IntoResponse {
    match state
        .query
        .list(params.page.as_deref(), params.limit.as_deref())
        .await
    {
        Ok(listing) => Json(listing).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn api_search_videos(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> impl IntoResponse {
    search(&state, params, SearchMode::Substring).await
}

pub async fn api_search_videos_fulltext(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> impl IntoResponse {
    search(&state, params, SearchMode::FullText).await
}

async fn search(state: &AppState, params: SearchQuery, mode: SearchMode) -> Response {
    match state.query.search(params.q.as_deref(), mode).await {
        Ok(results) => Json(results).into_response(),
        Err(e) => e.into_response(),
    }
}
