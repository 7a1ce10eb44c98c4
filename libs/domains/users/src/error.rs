use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::error_response;
use core_config::server::IncludeMessage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(i64),

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    /// A payload field broke one of its format rules
    #[error("{0}")]
    InvalidFormat(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The operation would leave the system without an administrator
    #[error("{0}")]
    Security(String),

    #[error("Malformed request body: {0}")]
    Malformed(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

/// Failure classes the API distinguishes, each with a fixed status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    SecurityViolation,
    /// Integrity violations and general application-level failures
    DataConflict,
    InvalidFormat,
    MalformedPayload,
    Unclassified,
}

impl FailureKind {
    pub fn status(self) -> StatusCode {
        match self {
            FailureKind::SecurityViolation => StatusCode::CONFLICT,
            FailureKind::DataConflict => StatusCode::BAD_REQUEST,
            FailureKind::InvalidFormat => StatusCode::BAD_REQUEST,
            FailureKind::MalformedPayload => StatusCode::UNPROCESSABLE_ENTITY,
            FailureKind::Unclassified => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl UserError {
    pub fn kind(&self) -> FailureKind {
        match self {
            UserError::InvalidFormat(_) => FailureKind::InvalidFormat,
            UserError::NotFound(_)
            | UserError::DuplicateEmail(_)
            | UserError::Validation(_)
            | UserError::InvalidCredentials => FailureKind::DataConflict,
            UserError::Security(_) => FailureKind::SecurityViolation,
            UserError::Malformed(_) => FailureKind::MalformedPayload,
            UserError::PasswordHash(_) | UserError::Internal(_) => FailureKind::Unclassified,
        }
    }
}

/// A classified failure, ready to be written as the shared error body.
#[derive(Debug)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub message: String,
    policy: IncludeMessage,
}

impl ApiFailure {
    /// Classifies `error` raised by `operation` and logs it once at `warn`.
    pub fn classify(operation: &str, error: UserError, policy: IncludeMessage) -> Self {
        let kind = error.kind();
        let message = error.to_string();

        tracing::warn!(?kind, "{}: error -> {}", operation, message);

        Self {
            status: kind.status(),
            message,
            policy,
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        error_response(self.status, self.message, self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::{Context, SubscriberExt};

    /// Records the level of every event it sees.
    struct Levels(Arc<Mutex<Vec<tracing::Level>>>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for Levels {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            self.0.lock().unwrap().push(*event.metadata().level());
        }
    }

    #[test]
    fn test_every_variant_maps_to_its_status() {
        let cases = [
            (UserError::Security("last admin".into()), StatusCode::CONFLICT),
            (UserError::DuplicateEmail("a@b.c".into()), StatusCode::BAD_REQUEST),
            (UserError::NotFound(9), StatusCode::BAD_REQUEST),
            (UserError::Validation("id is required".into()), StatusCode::BAD_REQUEST),
            (UserError::InvalidCredentials, StatusCode::BAD_REQUEST),
            (UserError::InvalidFormat("bad email".into()), StatusCode::BAD_REQUEST),
            (UserError::Malformed("eof".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (UserError::PasswordHash("salt".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (UserError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(error.kind().status(), status, "{:?}", error);
        }
    }

    #[test]
    fn test_invalid_format_message_is_the_violation_text() {
        let failure = ApiFailure::classify(
            "create",
            UserError::InvalidFormat("Email must be a valid address".into()),
            IncludeMessage::Always,
        );
        assert_eq!(failure.status, StatusCode::BAD_REQUEST);
        assert_eq!(failure.message, "Email must be a valid address");
    }

    #[test]
    fn test_failure_response_uses_policy() {
        let response = ApiFailure::classify(
            "delete",
            UserError::Internal("db at 10.0.0.3 down".into()),
            IncludeMessage::Never,
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_each_failure_is_logged_once_at_warn() {
        let levels = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(Levels(Arc::clone(&levels)));

        tracing::subscriber::with_default(subscriber, || {
            ApiFailure::classify("list", UserError::Internal("boom".into()), IncludeMessage::Always);
            ApiFailure::classify("show", UserError::NotFound(4), IncludeMessage::Always);
        });

        assert_eq!(
            *levels.lock().unwrap(),
            vec![tracing::Level::WARN, tracing::Level::WARN]
        );
    }
}
