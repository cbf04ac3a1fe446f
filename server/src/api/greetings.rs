//! Step 19 endpoints.
//!
//! - GET /test/step19/greet?name=  - Greeting
//! - GET /test/step19/numbers      - `1..=5` as a sequence
//! - GET /test/step19/sum          - `15`
//! - GET /test/step19/optional/:id - Item name, 404 when the id is not positive

use crate::server::state::AppState;
use axum::{Json, extract::State, response::Response};
use everydoc_web::{StreamFormat, ValidPath, ValidQuery, WebResult, reply};
use serde::Deserialize;

/// Query parameters for a greeting.
#[derive(Debug, Deserialize)]
pub struct GreetParams {
    /// Who to greet
    pub name: String,
}

/// Greet someone.
///
/// # Errors
///
/// `INTERNAL_ERROR` for a blank name, `VALIDATION_ERROR` when it is missing.
pub async fn greet(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<GreetParams>,
) -> WebResult<String> {
    reply::text(state.greetings.greet(&params.name)).await
}

/// Stream the numbers one to five.
pub async fn numbers(State(state): State<AppState>, format: StreamFormat) -> Response {
    reply::many(format, state.greetings.numbers()).await
}

/// Sum of the numbers.
///
/// # Errors
///
/// Never fails in practice.
pub async fn sum(State(state): State<AppState>) -> WebResult<Json<i64>> {
    reply::json(state.greetings.sum()).await
}

/// Optional item name.
///
/// # Errors
///
/// `NOT_FOUND` when the id is not positive.
pub async fn optional(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
) -> WebResult<String> {
    reply::text(state.greetings.find_optional(id)).await
}
