//! Error types and error handling for the application
//!
//! Every handler returns `Result<_, AppError>`; `IntoResponse` is the one place
//! where an error becomes a status code and a `{"error": message}` body.

use crate::storage::StorageError;
use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// A required form field is missing or malformed
    #[error("{0}")]
    Validation(String),

    /// The referenced record does not exist
    #[error("{0}")]
    NotFound(String),

    /// The request would break a booking invariant
    #[error("{0}")]
    Conflict(String),

    /// Storage engine failure
    #[error("Storage error: {0}")]
    Storage(StorageError),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Shorthand for a "<what> required" validation error
    pub fn required(field: &str) -> Self {
        AppError::Validation(format!("{} required", field))
    }

    /// Shorthand for a "<entity> not found" error
    pub fn not_found(entity: &str) -> Self {
        AppError::NotFound(format!("{} not found", entity))
    }

    /// HTTP status code this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client; server failures get a fixed text
    pub fn client_message(&self) -> String {
        if self.status_code().is_server_error() {
            "internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        // `/api/person/abc` names no record
        AppError::NotFound(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DateTaken(_)
            | StorageError::PersonInUse(_)
            | StorageError::ActivityInUse(_) => AppError::Conflict(err.to_string()),
            StorageError::UnknownPerson(_) | StorageError::UnknownActivity(_) => {
                AppError::Validation(err.to_string())
            }
            StorageError::Database(_) => AppError::Storage(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.client_message(),
        }));

        (status, body).into_response()
    }
}
