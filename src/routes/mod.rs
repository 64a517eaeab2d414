//! API Routes
//!
//! - `POST /api/search` - keyword search with optional date range
//! - `POST /api/related-keywords` - related-keyword synthesis
//! - `POST /api/discovery-path` - guided tour assembly
//! - `GET /api/health` - health check

pub mod discovery;
pub mod health;
pub mod keywords;
pub mod search;

#[cfg(test)]
mod tests;

use axum::Router;
use tracing::info;

use crate::middleware::cors::apply_cors;
use crate::models::AppState;

pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let api_router = Router::new()
        .merge(search::router(state.clone()))
        .merge(keywords::router(state.clone()))
        .merge(discovery::router(state))
        .merge(health::router());

    apply_cors(api_router)
}
