//! # Everydoc Testing
//!
//! Testing utilities for the Everydoc API.
//!
//! This crate provides:
//! - [`InMemoryOrderRepository`]: the order port without a database
//! - [`StepVerifier`]: fluent, signal-by-signal assertions over pipelines
//! - [`file_parts`]: upload parts built in memory, including failing and
//!   stalled bodies
//!
//! ## Example
//!
//! ```
//! use everydoc_core::order::Order;
//! use everydoc_core::repository::OrderRepository;
//! use everydoc_testing::{InMemoryOrderRepository, StepVerifier};
//!
//! # tokio_test::block_on(async {
//! let repo = InMemoryOrderRepository::with_orders([Order::new(1, 500, "PENDING")]);
//!
//! StepVerifier::create(repo.find_by_user_id(1))
//!     .assert_next(|order| assert_eq!(order.total_amount(), 500))
//!     .verify_complete()
//!     .await;
//! # });
//! ```

pub mod file_parts;
mod in_memory_orders;
mod step_verifier;

pub use in_memory_orders::InMemoryOrderRepository;
pub use step_verifier::StepVerifier;
