use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;

use crate::models::{AppState, Event, SearchRequest};
use crate::types::{AppError, AppResult};

pub const SEARCH_NEIGHBORS: usize = 50;

const SEARCH_ERROR: &str = "An error occurred while searching";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/search", post(search))
        .with_state(state)
}

async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> AppResult<Json<Vec<Event>>> {
    let keyword = request.keyword.trim();
    if keyword.is_empty() {
        return Err(AppError::Validation("Keyword is required".to_string()));
    }
    info!("search request for {keyword:?}");

    let embedding = state
        .embedder
        .embed(keyword)
        .await
        .map_err(|e| e.public(SEARCH_ERROR))?;
    let mut results = state
        .store
        .query(&embedding, SEARCH_NEIGHBORS)
        .await
        .map_err(|e| e.public(SEARCH_ERROR))?;

    // The date filter only applies when both bounds are present.
    if let (Some(start), Some(end)) = (request.start_date, request.end_date) {
        results.retain(|event| event.date_within(start, end));
    }

    Ok(Json(results))
}
