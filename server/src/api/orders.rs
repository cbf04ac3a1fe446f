//! Order API endpoints.
//!
//! - GET    /test/step18/orders                  - All orders
//! - POST   /test/step18/orders                  - Store an order
//! - GET    /test/step18/orders/:id              - One order
//! - DELETE /test/step18/orders/:id              - Delete an order
//! - PATCH  /test/step18/orders/:id/status       - Set the status (`?status=`)
//! - GET    /test/step18/orders/status/:status   - Orders in a status
//! - GET    /test/step18/orders/user/:user_id    - Orders of a user
//! - GET    /test/step18/orders/user/:user_id/sum - Total amount of a user
//! - GET    /test/step18/orders/amount/:min      - Orders above an amount, largest first
//!
//! Sequence endpoints answer with a JSON array, or with server-sent
//! events when the client accepts `text/event-stream`.

use crate::server::state::AppState;
use axum::{Json, extract::State, response::Response};
use everydoc_core::order::Order;
use everydoc_web::{StreamFormat, ValidJson, ValidPath, ValidQuery, WebResult, reply};
use serde::Deserialize;

/// Query parameters for a status update.
#[derive(Debug, Deserialize)]
pub struct StatusParams {
    /// New status
    pub status: String,
}

/// List every order.
pub async fn list_orders(State(state): State<AppState>, format: StreamFormat) -> Response {
    reply::many(format, state.orders.find_all()).await
}

/// Get one order.
///
/// # Errors
///
/// `NOT_FOUND` when there is no such order.
pub async fn get_order(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
) -> WebResult<Json<Order>> {
    reply::json(state.orders.find_by_id(id)).await
}

/// List orders in a status.
pub async fn orders_by_status(
    State(state): State<AppState>,
    ValidPath(status): ValidPath<String>,
    format: StreamFormat,
) -> Response {
    reply::many(format, state.orders.find_by_status(&status)).await
}

/// List the orders of a user.
pub async fn orders_by_user(
    State(state): State<AppState>,
    ValidPath(user_id): ValidPath<i64>,
    format: StreamFormat,
) -> Response {
    reply::many(format, state.orders.find_by_user_id(user_id)).await
}

/// Store an order; the response carries the assigned id.
///
/// # Errors
///
/// `VALIDATION_ERROR` for an undecodable body, a negative amount or a
/// blank status.
pub async fn create_order(
    State(state): State<AppState>,
    ValidJson(order): ValidJson<Order>,
) -> WebResult<Json<Order>> {
    reply::json(state.orders.save(order)).await
}

/// Delete an order.
///
/// # Errors
///
/// `INTERNAL_ERROR` when the store fails.
pub async fn delete_order(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
) -> WebResult<String> {
    reply::text(state.orders.delete(id)).await
}

/// List orders whose amount is above `min`, largest first.
pub async fn orders_above_amount(
    State(state): State<AppState>,
    ValidPath(min): ValidPath<i64>,
    format: StreamFormat,
) -> Response {
    reply::many(format, state.orders.find_by_amount_greater_than(min)).await
}

/// Total amount ordered by a user.
///
/// # Errors
///
/// `INTERNAL_ERROR` when the store fails.
pub async fn order_total_for_user(
    State(state): State<AppState>,
    ValidPath(user_id): ValidPath<i64>,
) -> WebResult<Json<i64>> {
    reply::json(state.orders.sum_amount_by_user_id(user_id)).await
}

/// Set the status of an order.
///
/// # Errors
///
/// `VALIDATION_ERROR` when `status` is missing.
pub async fn update_order_status(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
    ValidQuery(params): ValidQuery<StatusParams>,
) -> WebResult<String> {
    reply::text(state.orders.update_status(id, &params.status)).await
}
