//! Error handling for the Corkboard server

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use corkboard::{CorkboardError, ErrorKind};
use corkboard::ratelimit::RateDecision;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::governor::rate_headers;

/// API error response
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Server error types
#[derive(Debug, Error)]
pub enum ServerError {
    /// Engine error, mapped through its machine-checkable kind
    #[error("{0}")]
    Engine(#[from] CorkboardError),

    /// Missing or invalid bearer token
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Validation error raised at the HTTP layer
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Request was denied by the rate governor
    #[error("Rate limit exceeded")]
    RateLimited(RateDecision),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Engine(e) => match e.kind() {
                ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Forbidden | ErrorKind::PolicyDenied => StatusCode::FORBIDDEN,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Auth(_) => StatusCode::UNAUTHORIZED,
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ServerError::Engine(e) => e.kind().as_str(),
            ServerError::Auth(_) => "unauthenticated",
            ServerError::Validation(_) => "validation_failed",
            ServerError::NotFound(_) => "not_found",
            ServerError::RateLimited(_) => "rate_limit_exceeded",
            ServerError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = ErrorResponse {
            error: self.error_type().to_string(),
            message: self.to_string(),
        };

        match self {
            ServerError::RateLimited(ref decision) => {
                (status, rate_headers(decision), Json(error_response)).into_response()
            }
            _ => (status, Json(error_response)).into_response(),
        }
    }
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;
