use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::web::models::ErrorResponse;

/// Errors the chat endpoints report to the browser. The display strings are
/// the exact bodies sent to clients, so they never carry upstream detail.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Only POST requests are allowed")]
    MethodNotAllowed,
    #[error("Missing 'message' field")]
    MissingMessage,
    #[error("Invalid 'history' field")]
    InvalidHistory,
    #[error("Request body too large")]
    PayloadTooLarge,
    #[error("Server misconfigured")]
    Misconfigured,
    #[error("Upstream request failed")]
    Upstream,
    #[error("Internal server error")]
    Internal,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::MissingMessage | ApiError::InvalidHistory => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Misconfigured | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
