//! Error types for web handlers.
//!
//! [`AppError`] is the single place where a failed pipeline becomes an
//! HTTP response. Every `DomainError` kind maps to one status and one
//! machine-readable code; the body is always the envelope
//! `{"code": ..., "message": ...}`.
//!
//! | Kind         | Status | Code               | Log level |
//! |--------------|--------|--------------------|-----------|
//! | `NotFound`   | 404    | `NOT_FOUND`        | WARN      |
//! | `Validation` | 400    | `VALIDATION_ERROR` | WARN      |
//! | `Internal`   | 500    | `INTERNAL_ERROR`   | ERROR     |

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use everydoc_core::error::{DomainError, ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Application error type for web handlers.
///
/// Built from a [`DomainError`]; the client sees only the public message,
/// while the cause of an internal failure is kept for logging.
///
/// # Examples
///
/// ```ignore
/// async fn handler(Path(id): Path<i64>) -> Result<Json<Order>, AppError> {
///     let order = service.find_by_id(id).await?;
///     Ok(Json(order))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// Failure kind
    kind: ErrorKind,
    /// Error message (user-facing)
    message: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create an error of `kind` with a user-facing message.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            kind.default_message().to_string()
        } else {
            message
        };
        Self {
            kind,
            message,
            source: None,
        }
    }

    /// Create a 400 validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a 404 not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a 500 error. The client never sees `source`.
    #[must_use]
    pub fn internal(source: impl Into<anyhow::Error>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::new(ErrorKind::Internal, "")
        }
    }

    /// Failure kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The response envelope.
    #[must_use]
    pub fn body(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.code().to_string(),
            message: self.message.clone(),
        }
    }

    /// Log the failure and count it. Runs once per failed request.
    pub fn report(&self) {
        let code = self.code();
        match (&self.kind, &self.source) {
            (ErrorKind::Internal, Some(source)) => tracing::error!(
                code,
                message = %self.message,
                error = ?source,
                "Internal server error"
            ),
            (ErrorKind::Internal, None) => {
                tracing::error!(code, message = %self.message, "Internal server error");
            }
            _ => tracing::warn!(code, message = %self.message, "Request failed"),
        }
        metrics::counter!("http_errors_total", "code" => code).increment(1);
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (for client error handling).
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Internal(source) => Self::internal(source),
            other => Self::new(other.kind(), other.public_message()),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}
