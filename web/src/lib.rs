//! Axum integration for Everydoc pipelines.
//!
//! Handlers in the server crate build [`Single`](everydoc_core::Single) and
//! [`Many`](everydoc_core::Many) pipelines; this crate is the imperative
//! shell around them.
//!
//! # Request Flow
//!
//! 1. **Extract** path, query, body or multipart parts; malformed input
//!    becomes a `VALIDATION_ERROR` before any handler code runs
//! 2. **Build** the pipeline by calling a service
//! 3. **Subscribe** through [`reply`], once per request
//! 4. **Render** the value, the negotiated sequence encoding, or the
//!    [`AppError`] envelope
//!
//! # Example
//!
//! ```ignore
//! use everydoc_web::{reply, AppError, extractors::ValidPath};
//!
//! async fn get_order(
//!     State(state): State<AppState>,
//!     ValidPath(id): ValidPath<i64>,
//! ) -> Result<Json<Order>, AppError> {
//!     reply::json(state.orders.find_by_id(id)).await
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod multipart;
pub mod reply;

// Re-export key types for convenience
pub use error::{AppError, ErrorResponse};
pub use extractors::{CorrelationId, StreamFormat, ValidJson, ValidPath, ValidQuery};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use multipart::{FormPart, MultipartForm};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
