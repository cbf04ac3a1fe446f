//! Domain error taxonomy.
//!
//! Every failure that crosses a pipeline boundary is a [`DomainError`].
//! The set of kinds is closed: transports map each [`ErrorKind`] to a
//! status and a stable machine-readable code, and never see anything else.

use std::fmt;
use thiserror::Error;

/// The closed set of failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The requested resource does not exist.
    NotFound,
    /// The request was malformed or violated a business rule.
    Validation,
    /// Anything unexpected: storage, I/O, bugs.
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code sent to clients.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// HTTP status associated with this kind.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Validation => 400,
            Self::Internal => 500,
        }
    }

    /// Message used when the error carries none, or when its own message
    /// must not leave the process.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::NotFound => "resource not found",
            Self::Validation => "invalid request",
            Self::Internal => "server error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A failure raised somewhere inside a pipeline.
///
/// `Internal` keeps its cause as an [`anyhow::Error`] so the original
/// typed error can be recovered with [`DomainError::source_as`].
#[derive(Debug, Error)]
pub enum DomainError {
    /// Resource missing.
    #[error("{0}")]
    NotFound(String),

    /// Bad input or broken business rule.
    #[error("{0}")]
    Validation(String),

    /// Unexpected failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    /// Create a `NotFound` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a `Validation` error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wrap any error as `Internal`.
    #[must_use]
    pub fn internal<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::Internal(err.into())
    }

    /// The kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Message safe to show a client.
    ///
    /// Internal details never leak; empty messages fall back to the
    /// kind's default.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::NotFound(msg) | Self::Validation(msg) if !msg.is_empty() => msg.clone(),
            _ => self.kind().default_message().to_string(),
        }
    }

    /// Downcast the cause of an `Internal` error.
    ///
    /// Returns `None` for the other kinds or when the cause has a
    /// different type.
    #[must_use]
    pub fn source_as<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        match self {
            Self::Internal(cause) => cause.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Result alias used by pipeline stages.
pub type DomainResult<T> = Result<T, DomainError>;
