pub mod handlers;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use core_config::server::IncludeMessage;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard error response structure.
///
/// Every failed request is answered with this body, whatever produced the
/// failure (a domain handler, the role guard, or the router fallback).
///
/// # JSON Example
///
/// ```json
/// {
///   "timestamp": "2024-05-01T10:00:00Z",
///   "status": 400,
///   "error": "Bad Request",
///   "message": "Email must be a valid address"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// When the failure was produced
    pub timestamp: DateTime<Utc>,
    /// Numeric HTTP status, mirrored from the response line
    pub status: u16,
    /// Canonical reason phrase of the status
    pub error: String,
    /// Failure message, or the reason phrase when messages are suppressed
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>, policy: IncludeMessage) -> Self {
        let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
        let message = match policy {
            IncludeMessage::Always => message.into(),
            IncludeMessage::Never => reason.clone(),
        };

        Self {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error: reason,
            message,
        }
    }
}

/// Helper function to create error responses.
///
/// # Example
///
/// ```rust,ignore
/// use axum::http::StatusCode;
/// use axum_helpers::errors::error_response;
/// use core_config::server::IncludeMessage;
///
/// let response = error_response(
///     StatusCode::FORBIDDEN,
///     "Access Denied",
///     IncludeMessage::Always,
/// );
/// ```
pub fn error_response(
    status: StatusCode,
    message: impl Into<String>,
    policy: IncludeMessage,
) -> Response {
    (status, Json(ErrorResponse::new(status, message, policy))).into_response()
}
