//! HTTP server module for the Everydoc API.
//!
//! This module provides the Axum-based HTTP server with:
//! - Application state management
//! - Router configuration
//! - Graceful shutdown handling

pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;

use std::time::Duration;

/// Resolve when the process receives Ctrl-C.
///
/// If the signal handler cannot be installed the server keeps running
/// until it is killed.
pub async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Serve `router` on `listener` until Ctrl-C, then give in-flight requests
/// `grace` to finish.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve(
    listener: tokio::net::TcpListener,
    router: axum::Router,
    grace: Duration,
) -> std::io::Result<()> {
    let (stopping_tx, mut stopping_rx) = tokio::sync::watch::channel(false);
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = stopping_tx.send(true);
    });

    tokio::select! {
        result = server.into_future() => result,
        () = async {
            if stopping_rx.wait_for(|stopping| *stopping).await.is_ok() {
                tokio::time::sleep(grace).await;
            } else {
                std::future::pending::<()>().await;
            }
        } => {
            tracing::warn!(grace_secs = grace.as_secs(), "Shutdown grace period elapsed, dropping open connections");
            Ok(())
        }
    }
}
