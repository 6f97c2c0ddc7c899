use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Main service error type
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Duplicate document for this user")]
    DuplicateDocument {
        existing_document_id: String,
        existing_filename: String,
    },

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Document processing failed")]
    Processing(#[from] ProcessingError),
}

/// Faults raised inside a processing backend. On the async path these are
/// captured by the worker pool and recorded on the affected job only; they
/// never reach the pool itself or other jobs.
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("backend error: {message}")]
    Backend { message: String },
}

/// API error response (matches Axum's built-in JsonRejection format)
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            ServiceError::DuplicateDocument { .. } => StatusCode::CONFLICT,
            ServiceError::Io(_) | ServiceError::Processing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ServiceError::InvalidRequest { .. } => "invalid_request",
            ServiceError::DuplicateDocument { .. } => "duplicate_document",
            ServiceError::Io(_) => "io_error",
            ServiceError::Processing(_) => "processing_error",
        }
    }

    /// Structured payload accompanying the error, where one exists. A
    /// duplicate carries enough for the client to offer a replace action.
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ServiceError::DuplicateDocument {
                existing_document_id,
                existing_filename,
            } => Some(serde_json::json!({
                "existing_document_id": existing_document_id,
                "existing_filename": existing_filename,
                "can_replace": true,
            })),
            _ => None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = Some(self.error_code().to_string());
        let details = self.details();

        let response = ErrorResponse {
            message: self.to_string(),
            code,
            details,
        };

        (status, Json(response)).into_response()
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
