// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::{
    db::StoreError,
    draft::DraftError,
    save::SaveError,
    validation::messages,
};

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 400 Bad Request with one message per failed check
    Validation(Vec<String>),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500, reported to the user as a single summary line
    SaveFailed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
            AppError::SaveFailed(msg) => {
                tracing::error!("Save failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Failed to save exam to database" }),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "details": details }),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<DraftError> for AppError {
    fn from(err: DraftError) -> Self {
        match err {
            DraftError::IndexOutOfRange { .. } => AppError::NotFound(err.to_string()),
            DraftError::InvalidQuestion(issues) => AppError::Validation(messages(&issues)),
            DraftError::SaveInProgress => {
                AppError::Conflict("This exam is being saved, try again shortly".to_string())
            }
        }
    }
}

impl From<SaveError> for AppError {
    fn from(err: SaveError) -> Self {
        match err {
            SaveError::NotReady(issues) => AppError::Validation(messages(&issues)),
            SaveError::InvalidQuestion { number, issues } => AppError::Validation(
                issues
                    .iter()
                    .map(|issue| format!("Question {number}: {issue}"))
                    .collect(),
            ),
            SaveError::Store(e) => AppError::SaveFailed(e.to_string()),
        }
    }
}
