//! Persistence port for orders.
//!
//! # Implementations
//!
//! - `PostgresOrderRepository` (in `everydoc-postgres`): sqlx over `PostgreSQL`
//! - `InMemoryOrderRepository` (in `everydoc-testing`): `BTreeMap` behind a lock,
//!   used by tests and by `STORAGE=memory`
//!
//! # Example
//!
//! ```no_run
//! use everydoc_core::order::Order;
//! use everydoc_core::repository::OrderRepository;
//!
//! async fn place<R: OrderRepository>(repo: &R) {
//!     let stored = repo.save(Order::new(1, 500, "PENDING")).await;
//!     let total = repo.sum_amount_by_user_id(1).await;
//!     # let _ = (stored, total);
//! }
//! ```

use crate::order::Order;
use crate::pipeline::{Many, Single};

/// Storage operations for [`Order`] records.
///
/// Every method returns a lazy pipeline: calling it only describes the
/// query, which runs when the result is awaited or polled. No method may
/// block the calling thread while waiting on I/O.
///
/// # Dyn Compatibility
///
/// Methods return boxed pipelines rather than `async fn` so handlers can
/// share the repository as `Arc<dyn OrderRepository>`.
pub trait OrderRepository: Send + Sync {
    /// Every order.
    fn find_all(&self) -> Many<Order>;

    /// The order with `id`. Completes empty when there is none.
    fn find_by_id(&self, id: i64) -> Single<Order>;

    /// Orders whose status equals `status` exactly.
    fn find_by_status(&self, status: &str) -> Many<Order>;

    /// Orders belonging to `user_id`.
    fn find_by_user_id(&self, user_id: i64) -> Many<Order>;

    /// Insert `order` when it has no id, update it otherwise.
    ///
    /// Emits the stored form, which always carries an id. Updating an id
    /// that does not exist fails with `NotFound`.
    fn save(&self, order: Order) -> Single<Order>;

    /// Remove the order with `id`, if any. Completes empty.
    fn delete_by_id(&self, id: i64) -> Single<()>;

    /// Orders with `total_amount > amount`, largest first.
    fn find_by_total_amount_greater_than(&self, amount: i64) -> Many<Order>;

    /// Sum of `total_amount` over the user's orders; `0` when there are none.
    fn sum_amount_by_user_id(&self, user_id: i64) -> Single<i64>;

    /// Set the status of order `id`, emitting the number of rows changed.
    fn update_status(&self, id: i64, status: &str) -> Single<i32>;
}

/// Cheap liveness check against a backing store.
pub trait ReadinessProbe: Send + Sync {
    /// Completes empty when the store answers, fails otherwise.
    fn ping(&self) -> Single<()>;
}
