//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use axum::{Json, extract::State, http::StatusCode};
use everydoc_core::repository::ReadinessProbe;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Simple health check endpoint (for basic liveness).
///
/// Returns 200 OK to indicate the service is running.
/// This endpoint does NOT check dependencies (database, etc.).
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness report for one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessReport {
    /// Dependency that was checked.
    pub component: String,
    /// `UP` or `DOWN`.
    pub status: String,
}

/// Readiness check against the order store.
///
/// # Status Codes
///
/// - 200 OK: the store answered a ping
/// - 503 Service Unavailable: it did not
///
/// # Endpoint
///
/// ```text
/// GET /ready
/// ```
pub async fn readiness_check(
    State(probe): State<Arc<dyn ReadinessProbe>>,
) -> (StatusCode, Json<ReadinessReport>) {
    let (status, label) = match probe.ping().await {
        Ok(_) => (StatusCode::OK, "UP"),
        Err(err) => {
            tracing::warn!(error = %err, "Readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "DOWN")
        }
    };

    (
        status,
        Json(ReadinessReport {
            component: "storage".to_string(),
            status: label.to_string(),
        }),
    )
}
