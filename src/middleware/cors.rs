// CORS configuration
// The API is consumed from a browser map UI served on another origin.

use axum::Router;
use tower_http::cors::CorsLayer;

pub fn apply_cors(router: Router) -> Router {
    router.layer(CorsLayer::permissive())
}
