use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Success envelope for catalog endpoints
///
/// `status` mirrors the HTTP status code. `message` and `data` are omitted
/// when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 200 with data only
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            message: None,
            data: Some(data),
        }
    }

    /// Any status with a message and data
    pub fn with_message(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            status: status.as_u16(),
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Message only, no data
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: Some(message.into()),
            data: None,
        }
    }
}
