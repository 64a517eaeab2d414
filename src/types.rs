// Error taxonomy shared across the crate

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{message}")]
    Endpoint { message: &'static str, detail: String },
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Swaps the generic 500 body for an endpoint-specific message.
    /// Validation errors already carry their public text and pass through.
    pub fn public(self, message: &'static str) -> AppError {
        match self {
            AppError::Validation(_) => self,
            other => AppError::Endpoint {
                message,
                detail: other.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::Endpoint { message, detail } => {
                tracing::error!("{detail}");
                (StatusCode::INTERNAL_SERVER_ERROR, (*message).to_string())
            }
            AppError::Provider(detail) => {
                tracing::error!("provider failure: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("internal failure: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
