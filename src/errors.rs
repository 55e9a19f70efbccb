use actix_web::HttpResponse;
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::UserNotFound
            | DomainError::ProductNotFound
            | DomainError::OrderNotFound => AppError::NotFound(e.to_string()),
            DomainError::IdentityMismatch => AppError::Unauthorized(e.to_string()),
            DomainError::Storage(msg) => AppError::Internal(msg),
        }
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(e: diesel::result::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(errors) => {
                HttpResponse::UnprocessableEntity().json(serde_json::json!({
                    "error": "Validation failed",
                    "fields": errors
                }))
            }
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(serde_json::json!({
                "error": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(serde_json::json!({
                "error": msg
            })),
            // Storage messages are surfaced verbatim; fine for an internal
            // tool, would need scrubbing before a public deployment.
            AppError::Internal(msg) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": msg
                }))
            }
        }
    }
}
