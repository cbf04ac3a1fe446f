//! # Everydoc Core
//!
//! Protocol-agnostic building blocks for the Everydoc API.
//!
//! ## Core Concepts
//!
//! - **Pipeline**: [`Single`](pipeline::Single) and [`Many`](pipeline::Many),
//!   lazy and cancellable descriptions of asynchronous work
//! - **Domain error**: [`DomainError`](error::DomainError), the closed set of
//!   failure kinds every pipeline can end with
//! - **Order**: the persisted record and its [`OrderRepository`](repository::OrderRepository) port
//! - **File part**: a streamed upload, as handed over by a transport
//!
//! ## Example
//!
//! ```
//! use everydoc_core::error::DomainError;
//! use everydoc_core::pipeline::Single;
//!
//! fn find_item(id: i64) -> Single<String> {
//!     if id <= 0 {
//!         return Single::error(DomainError::validation(format!("id must be positive: {id}")));
//!     }
//!     Single::just(format!("item {id}"))
//! }
//!
//! # tokio_test::block_on(async {
//! assert!(find_item(0).await.is_err());
//! # });
//! ```

pub mod error;
pub mod order;
pub mod pipeline;
pub mod repository;
pub mod upload;

pub use bytes::Bytes;
pub use error::{DomainError, DomainResult, ErrorKind};
pub use order::Order;
pub use pipeline::{Many, Signal, SignalType, Single, SingleResult};
pub use repository::{OrderRepository, ReadinessProbe};
pub use upload::FilePart;
