//! HTTP error mapping.
//!
//! Every handler returns `Result<_, ApiError>`; this module decides the
//! status code and the JSON body the client sees. Validation failures carry
//! the itemized messages (capped), internal failures never leak details.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use snack_core::{ReportError, ValidationError, MAX_REPORTED_ISSUES};
use snack_db::DbError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The state blob failed validation; the write was not applied.
    #[error("validation failed")]
    Validation(Vec<ValidationError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Db(#[from] DbError),

    /// Non-database internal failure (backup I/O, serialization).
    #[error("{0}")]
    Internal(String),
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                let details: Vec<String> = errors
                    .iter()
                    .take(MAX_REPORTED_ISSUES)
                    .map(|e| e.to_string())
                    .collect();
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "validation failed", "details": details})),
                )
                    .into_response()
            }
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": message})),
            )
                .into_response(),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(json!({"error": message})),
            )
                .into_response(),
            ApiError::Db(err) => {
                error!(error = %err, "database failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "internal server error"})),
                )
                    .into_response()
            }
            ApiError::Internal(message) => {
                error!(error = %message, "internal failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "internal server error"})),
                )
                    .into_response()
            }
        }
    }
}
