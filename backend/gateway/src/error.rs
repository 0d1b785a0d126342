//! Mapping of runtime errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use appify_core::AppifyError;
use appify_logging::redact_sensitive_data;

/// An error response with a JSON `{ "error": ... }` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<AppifyError> for ApiError {
    fn from(err: AppifyError) -> Self {
        let status = match &err {
            AppifyError::Generation { .. } => StatusCode::BAD_GATEWAY,
            AppifyError::QuotaExceeded { .. } => StatusCode::PAYMENT_REQUIRED,
            AppifyError::Config(_) => StatusCode::BAD_REQUEST,
            AppifyError::Storage(_) | AppifyError::Materialize(_) | AppifyError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = redact_sensitive_data(&self.message);
        if self.status.is_server_error() {
            error!(status = %self.status, error = %message, "[Gateway] Request failed");
        }
        (self.status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
