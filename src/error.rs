// Error handling module for the catalog API
// Provides centralized error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use chrono::Utc;
use tracing::{debug, error};

/// Main error type for the catalog endpoints
///
/// Each variant maps to a specific HTTP status code and error response format.
#[derive(Debug)]
pub enum ApiError {
    /// Path id is not a well-formed document id
    /// Maps to HTTP 400 Bad Request
    InvalidId { resource: &'static str },

    /// Document not found by id
    /// Maps to HTTP 404 Not Found
    NotFound { resource: &'static str },

    /// Validation errors from request validation
    /// Maps to HTTP 400 Bad Request
    ValidationError(validator::ValidationErrors),

    /// Malformed query string parameters
    /// Maps to HTTP 400 Bad Request
    InvalidQuery(String),

    /// Database operation errors
    /// Maps to HTTP 500 Internal Server Error
    /// Sensitive details are filtered from client responses
    DatabaseError(sqlx::Error),

    /// Internal server errors
    /// Maps to HTTP 500 Internal Server Error
    InternalError(String),
}

/// Consistent error response structure
///
/// `status` mirrors the HTTP status so clients reading only the body see it.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub status: u16,

    /// Human-readable summary
    pub message: String,

    /// Short description of the cause
    pub error: String,

    /// Optional additional details (e.g., field-level validation errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// ISO 8601 timestamp of when the error occurred
    pub timestamp: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    /// Convert ApiError to HTTP status code and ErrorResponse
    ///
    /// 500-level errors are logged with their cause and answered with a
    /// generic message.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        let status = self.status_code();
        let (message, error, details) = match self {
            ApiError::InvalidId { resource } => {
                debug!("Malformed {} id", resource);
                (
                    format!("Invalid {} ID", resource.to_lowercase()),
                    "ID format is incorrect".to_string(),
                    None,
                )
            }
            ApiError::NotFound { resource } => {
                debug!("{} not found", resource);
                (
                    format!("{} not found", resource),
                    format!("No {} found with the given ID", resource.to_lowercase()),
                    None,
                )
            }
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);
                (
                    "Request validation failed".to_string(),
                    errors.to_string(),
                    Some(serde_json::to_value(errors).unwrap_or(serde_json::json!({}))),
                )
            }
            ApiError::InvalidQuery(msg) => {
                debug!("Invalid query parameters: {}", msg);
                ("Invalid query parameters".to_string(), msg.clone(), None)
            }
            ApiError::DatabaseError(db_error) => {
                error!("Database error: {:?}", db_error);
                (
                    "Internal Server Error".to_string(),
                    "A database error occurred".to_string(),
                    None,
                )
            }
            ApiError::InternalError(internal_msg) => {
                error!("Internal error: {}", internal_msg);
                (
                    "Internal Server Error".to_string(),
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        (
            status,
            ErrorResponse {
                status: status.as_u16(),
                message,
                error,
                details,
                timestamp: Utc::now().to_rfc3339(),
            },
        )
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidId { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert sqlx errors to ApiError
impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        ApiError::DatabaseError(error)
    }
}

/// Convert validator errors to ApiError
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}

/// Stored documents that fail to decode are an internal error
impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::InternalError(format!("Document encoding error: {}", error))
    }
}
