//! Actix Web error adapters for stack-control errors.
//!
//! This module provides implementations of Actix Web error traits
//! for the stack-control error types, allowing them to be used in Actix
//! Web handlers. Every fault surfaces as a structured JSON response; no
//! handler panics the control server, which must stay reachable even
//! when a managed process is unmanageable.

use crate::error::Error;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

// Implement ResponseError for our Error type
impl ResponseError for Error {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        HttpResponse::build(status_code)
            .content_type("application/json")
            .json(json!({
                "status": "error",
                "message": self.to_string(),
                "code": status_code.as_u16()
            }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::ProcessNotFound(_) => StatusCode::NOT_FOUND,
            Error::ConfigParse(_) => StatusCode::BAD_REQUEST,
            Error::ConfigInvalid(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Wrapper error type for request validation errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] Error),
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        HttpResponse::build(status_code)
            .content_type("application/json")
            .json(json!({
                "status": "error",
                "message": self.to_string(),
                "code": status_code.as_u16()
            }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedOperation(_) => StatusCode::NOT_IMPLEMENTED,
            ApiError::Internal(e) => e.status_code(),
        }
    }
}
