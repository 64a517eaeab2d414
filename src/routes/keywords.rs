use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;

use crate::models::{AppState, KeywordRequest, RelatedKeywordsResponse};
use crate::types::{AppError, AppResult};

pub const RELATED_KEYWORD_COUNT: usize = 5;

const KEYWORDS_ERROR: &str = "An error occurred while generating related keywords";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/related-keywords", post(related_keywords))
        .with_state(state)
}

async fn related_keywords(
    State(state): State<AppState>,
    Json(request): Json<KeywordRequest>,
) -> AppResult<Json<RelatedKeywordsResponse>> {
    let keyword = request.keyword.trim();
    if keyword.is_empty() {
        return Err(AppError::Validation("Keyword is required".to_string()));
    }
    info!("related-keywords request for {keyword:?}");

    let related_keywords = state
        .completions
        .related_keywords(keyword, RELATED_KEYWORD_COUNT)
        .await
        .map_err(|e| e.public(KEYWORDS_ERROR))?;

    Ok(Json(RelatedKeywordsResponse { related_keywords }))
}
