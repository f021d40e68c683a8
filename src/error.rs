use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

/// Application-level error type
#[derive(Debug)]
pub enum AppError {
    /// Validation error (malformed query parameters or request body)
    Validation(String),
    /// Not found error
    NotFound(String),
    /// The external search call failed; surfaced as a single typed failure
    SearchFailed(String),
    /// The overall request deadline elapsed before the search completed
    Timeout(String),
    /// Internal server error
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
    meta: ErrorMeta,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct ErrorMeta {
    request_id: String,
}

impl AppError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::SearchFailed(_) => "SEARCH_FAILED",
            Self::Timeout(_) => "TIMEOUT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::SearchFailed(msg) => write!(f, "Search failed: {msg}"),
            Self::Timeout(msg) => write!(f, "Timed out: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_response = ErrorResponse {
            error: ErrorBody {
                code: self.error_code().to_string(),
                message: self.to_string(),
                details: None,
            },
            meta: ErrorMeta {
                request_id: uuid::Uuid::new_v4().to_string(),
            },
        };

        match self {
            Self::Validation(_) => HttpResponse::BadRequest().json(error_response),
            Self::NotFound(_) => HttpResponse::NotFound().json(error_response),
            Self::SearchFailed(_) => HttpResponse::BadGateway().json(error_response),
            Self::Timeout(_) => HttpResponse::GatewayTimeout().json(error_response),
            Self::Internal(_) => HttpResponse::InternalServerError().json(error_response),
        }
    }
}

impl From<crate::services::SearchError> for AppError {
    fn from(err: crate::services::SearchError) -> Self {
        match err {
            crate::services::SearchError::Cancelled => {
                Self::Timeout("search cancelled before completion".to_string())
            }
            crate::services::SearchError::SearchFailed(msg) => Self::SearchFailed(msg),
        }
    }
}

impl From<crate::services::CombineError> for AppError {
    fn from(err: crate::services::CombineError) -> Self {
        match err {
            crate::services::CombineError::NoRepositories => {
                Self::Validation(err.to_string())
            }
        }
    }
}
