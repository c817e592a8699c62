//! Error handling for the NER server

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine readable error type
    pub error: String,
    /// Human readable description
    pub message: String,
}

/// Server error types
#[derive(Debug, Error)]
pub enum ServerError {
    /// Entity recognition failed
    #[error("Recognition failed: {0}")]
    Recognition(#[from] ner::NerError),

    /// Body is not valid JSON or could not be read
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Body is JSON but not an array of strings
    #[error("Validation error: {0}")]
    Validation(String),

    /// Body is not declared as JSON
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Body exceeds the configured limit
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Recognition(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ServerError::Recognition(_) => "recognition_error",
            ServerError::BadRequest(_) => "bad_request",
            ServerError::Validation(_) => "validation_error",
            ServerError::UnsupportedMediaType(_) => "unsupported_media_type",
            ServerError::PayloadTooLarge(_) => "payload_too_large",
            ServerError::Internal(_) => "internal_error",
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        match rejection.status() {
            StatusCode::UNPROCESSABLE_ENTITY => ServerError::Validation(message),
            StatusCode::UNSUPPORTED_MEDIA_TYPE => ServerError::UnsupportedMediaType(message),
            StatusCode::PAYLOAD_TOO_LARGE => ServerError::PayloadTooLarge(message),
            _ => ServerError::BadRequest(message),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // The request trace layer reports the status; this adds the cause
        tracing::debug!(status = status.as_u16(), error = %self, "Request failed");

        let error_response = ErrorResponse {
            error: self.error_type().to_string(),
            message: self.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;
