//! Error types for the signature viewer API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use signature_core::CompositeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Document not found: {0}")]
    BlobNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Composite(#[from] CompositeError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BlobNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Document not found: {}", id))
            }
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Composite(e) if e.is_user_error() => {
                tracing::warn!("View rejected: {}", e);
                let status = match e {
                    CompositeError::InProgress => StatusCode::CONFLICT,
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, e.to_string())
            }
            ApiError::Composite(e) => match e {
                CompositeError::SourceNotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
                other => {
                    tracing::error!("Composite failed: {}", other);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal error".to_string(),
                    )
                }
            },
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
