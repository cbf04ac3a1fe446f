//! Custom Axum extractors.
//!
//! This module contains:
//! - `CorrelationId`: the request correlation id, as stored by the middleware
//! - `ValidPath`, `ValidQuery`, `ValidJson`: axum's extractors whose
//!   rejections become `VALIDATION_ERROR` envelopes
//! - `StreamFormat`: how a sequence response should be encoded
//!
//! # Examples
//!
//! ```ignore
//! use everydoc_web::extractors::{StreamFormat, ValidPath};
//!
//! async fn orders_by_user(
//!     State(state): State<AppState>,
//!     ValidPath(user_id): ValidPath<i64>,
//!     format: StreamFormat,
//! ) -> Response {
//!     reply::many(format, state.orders.find_by_user_id(user_id)).await
//! }
//! ```

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{header, request::Parts},
};
use std::convert::Infallible;
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Read from request extensions when the correlation middleware ran,
/// otherwise from the `X-Correlation-ID` header, otherwise freshly generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(*id);
        }

        let correlation_id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// Path parameters; a value that does not parse is a validation error.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ValidPath<T>(pub T);

/// Query parameters; missing or malformed ones are a validation error.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ValidQuery<T>(pub T);

/// JSON body; an undecodable body is a validation error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ValidJson<T>(pub T);

/// Encoding negotiated for sequence responses.
///
/// `Accept: text/event-stream` selects server-sent events; anything else,
/// including no `Accept` header, selects a JSON array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFormat {
    /// One JSON array written after the sequence completes.
    JsonArray,
    /// One `data:` event per element, written as elements arrive.
    EventStream,
}

impl StreamFormat {
    /// Media type for server-sent events.
    pub const EVENT_STREAM: &'static str = "text/event-stream";

    /// Pick a format from an `Accept` header value.
    #[must_use]
    pub fn from_accept(accept: Option<&str>) -> Self {
        let wants_events = accept.is_some_and(|value| {
            value
                .split(',')
                .filter_map(|range| range.split(';').next())
                .any(|media| media.trim().eq_ignore_ascii_case(Self::EVENT_STREAM))
        });
        if wants_events {
            Self::EventStream
        } else {
            Self::JsonArray
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for StreamFormat
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let accept = parts
            .headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok());
        Ok(Self::from_accept(accept))
    }
}
