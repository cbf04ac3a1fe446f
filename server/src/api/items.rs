//! Item API endpoints.
//!
//! - GET /test/step20/items/:id      - Describe an item
//! - GET /test/step20/items/:id/log  - Same, with request/response/error logs
//! - GET /test/step20/external       - Call the external API (`?param=`)

use crate::server::state::AppState;
use axum::extract::State;
use everydoc_web::{ValidPath, ValidQuery, WebResult, reply};
use serde::Deserialize;

/// Query parameters for the external API call.
#[derive(Debug, Deserialize)]
pub struct ExternalParams {
    /// Forwarded to the external API
    pub param: String,
}

/// Describe an item.
///
/// # Errors
///
/// `VALIDATION_ERROR` for a non-positive id, `NOT_FOUND` for an unknown one.
pub async fn get_item(State(state): State<AppState>, ValidPath(id): ValidPath<i64>) -> WebResult<String> {
    reply::text(state.items.find_item(id)).await
}

/// Describe an item and log the lookup.
///
/// # Errors
///
/// See [`get_item`].
pub async fn get_item_logged(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
) -> WebResult<String> {
    reply::text(state.items.find_item_with_logging(id)).await
}

/// Call the external API.
///
/// # Errors
///
/// `VALIDATION_ERROR` when the external system is in an illegal state.
pub async fn call_external(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<ExternalParams>,
) -> WebResult<String> {
    reply::text(state.items.call_external_api(params.param)).await
}
