//! Application error type mapping to HTTP status codes.
//!
//! Error bodies use the same shape as successful responses:
//! `{"success": false, "embedding": null, "message": "..."}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use embedgate_types::error::DispatchError;
use embedgate_types::request::InferenceResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors surfaced by the dispatcher.
    Dispatch(DispatchError),
    /// Request body failed to parse.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<DispatchError> for AppError {
    fn from(e: DispatchError) -> Self {
        AppError::Dispatch(e)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Dispatch(DispatchError::ModelUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Dispatch(DispatchError::InvalidInput(_)) | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Dispatch(e) => e.to_string(),
            AppError::Validation(msg) => msg,
            AppError::Internal(msg) => format!("Inference failed: {msg}"),
        };
        (status, Json(InferenceResponse::failure(message))).into_response()
    }
}
