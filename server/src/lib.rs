//! # Everydoc Server
//!
//! HTTP API walking through reactive patterns one step at a time: file
//! uploads (step 17), an order store (step 18), testable pipelines
//! (step 19) and error handling in practice (step 20).
//!
//! ## Layout
//!
//! - [`config`]: environment configuration
//! - [`services`]: pipelines built per request
//! - [`api`]: axum handlers, one module per step
//! - [`server`]: state, router and graceful shutdown
//!
//! ## Example
//!
//! ```ignore
//! use everydoc_server::{AppState, build_router};
//! use everydoc_testing::InMemoryOrderRepository;
//!
//! let state = AppState::new(Arc::new(InMemoryOrderRepository::new()), "/tmp/uploads");
//! let app = build_router(state);
//! ```

pub mod api;
pub mod config;
pub mod server;
pub mod services;

pub use config::{Config, ConfigError, StorageBackend};
pub use server::{AppState, build_router};
