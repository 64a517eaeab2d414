use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;

use crate::discovery::PathAssembler;
use crate::models::{AppState, Event, KeywordRequest};
use crate::types::{AppError, AppResult};

const DISCOVERY_ERROR: &str = "An error occurred while creating discovery path";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/discovery-path", post(discovery_path))
        .with_state(state)
}

async fn discovery_path(
    State(state): State<AppState>,
    Json(request): Json<KeywordRequest>,
) -> AppResult<Json<Vec<Event>>> {
    let keyword = request.keyword.trim();
    if keyword.is_empty() {
        return Err(AppError::Validation("Keyword is required".to_string()));
    }
    info!("discovery-path request for {keyword:?}");

    let assembler = PathAssembler::new(
        state.embedder.clone(),
        state.completions.clone(),
        state.store.clone(),
    );
    let path = assembler
        .assemble(keyword)
        .await
        .map_err(|e| e.public(DISCOVERY_ERROR))?;

    Ok(Json(path))
}
