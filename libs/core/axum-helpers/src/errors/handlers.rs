use axum::{http::StatusCode, response::Response};
use core_config::server::IncludeMessage;

use super::error_response;

/// Handler for 404 Not Found errors.
///
/// This can be used as a fallback handler in your router.
pub async fn not_found() -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
        IncludeMessage::Always,
    )
}
