use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::extraction::ExtractionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// AI and database failures map to generic bodies — internal messages and
/// provider detail stay in the logs. Pipeline failures carry the
/// processing-log id so callers can reference the audit record.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("All AI providers failed (log {log_id})")]
    AiUnavailable { log_id: Uuid, detail: String },

    #[error("AI response was not decodable (log {log_id})")]
    AiResponseFormat { log_id: Uuid, detail: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Extraction(ExtractionError::UnsupportedFormat(mime)) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FORMAT",
                format!("Unsupported document format: {mime}"),
            ),
            AppError::Extraction(e) => {
                tracing::error!("Extraction error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXTRACTION_ERROR",
                    "Document text extraction failed".to_string(),
                )
            }
            AppError::AiUnavailable { log_id, detail } => {
                tracing::error!("All providers failed (log {log_id}): {detail}");
                (
                    StatusCode::BAD_GATEWAY,
                    "AI_UNAVAILABLE",
                    format!("AI processing failed; see processing log {log_id}"),
                )
            }
            AppError::AiResponseFormat { log_id, detail } => {
                tracing::error!("Undecodable AI response (log {log_id}): {detail}");
                (
                    StatusCode::BAD_GATEWAY,
                    "AI_RESPONSE_FORMAT",
                    format!("AI response was not usable; see processing log {log_id}"),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
