// Astromap - semantic exploration service for geolocated space events

pub mod client;
pub mod config;
pub mod discovery;
pub mod ingest;
pub mod llm;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod types;
pub mod vector_store;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
