//! Router configuration for the Everydoc server.
//!
//! Builds the complete Axum router with all endpoints.

use super::state::AppState;
use crate::api::{greetings, items, orders, tutorial, uploads};
use axum::{
    Router,
    routing::{get, patch},
};
use everydoc_web::correlation_id_layer;
use everydoc_web::handlers::{health_check, readiness_check};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Configures all routes including:
/// - Health checks
/// - Upload endpoints (step 17, GET or POST with a multipart body)
/// - Order endpoints (step 18)
/// - Greeting endpoints (step 19)
/// - Item endpoints (step 20)
/// - Tutorial pages
///
/// Every request gets a correlation id and a trace span.
pub fn build_router(state: AppState) -> Router {
    let upload_routes = Router::new()
        .route("/test/step17/info", get(uploads::file_info).post(uploads::file_info))
        .route("/test/step17/read", get(uploads::read_file).post(uploads::read_file))
        .route(
            "/test/step17/upload",
            get(uploads::upload_file).post(uploads::upload_file),
        )
        .route(
            "/test/step17/upload-with-meta",
            get(uploads::upload_with_meta).post(uploads::upload_with_meta),
        )
        .route(
            "/test/step17/upload-dbu",
            get(uploads::upload_with_open_options).post(uploads::upload_with_open_options),
        );

    let order_routes = Router::new()
        .route(
            "/test/step18/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route(
            "/test/step18/orders/:id",
            get(orders::get_order).delete(orders::delete_order),
        )
        .route("/test/step18/orders/:id/status", patch(orders::update_order_status))
        .route("/test/step18/orders/status/:status", get(orders::orders_by_status))
        .route("/test/step18/orders/user/:user_id", get(orders::orders_by_user))
        .route(
            "/test/step18/orders/user/:user_id/sum",
            get(orders::order_total_for_user),
        )
        .route("/test/step18/orders/amount/:min", get(orders::orders_above_amount));

    let greeting_routes = Router::new()
        .route("/test/step19/greet", get(greetings::greet))
        .route("/test/step19/numbers", get(greetings::numbers))
        .route("/test/step19/sum", get(greetings::sum))
        .route("/test/step19/optional/:id", get(greetings::optional));

    let item_routes = Router::new()
        .route("/test/step20/items/:id", get(items::get_item))
        .route("/test/step20/items/:id/log", get(items::get_item_logged))
        .route("/test/step20/external", get(items::call_external));

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .merge(upload_routes)
        .merge(order_routes)
        .merge(greeting_routes)
        .merge(item_routes)
        .merge(tutorial::routes())
        .layer(correlation_id_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
