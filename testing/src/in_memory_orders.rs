//! In-memory order storage.
//!
//! [`InMemoryOrderRepository`] implements the full `OrderRepository` port
//! over a `BTreeMap`, so tests run without a database and the server can
//! start with `STORAGE=memory`.

use everydoc_core::error::{DomainError, DomainResult};
use everydoc_core::order::Order;
use everydoc_core::pipeline::{Many, Single};
use everydoc_core::repository::{OrderRepository, ReadinessProbe};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

type Table = BTreeMap<i64, Order>;

#[derive(Debug, Default)]
struct Inner {
    rows: RwLock<Table>,
    last_id: AtomicI64,
    offline: AtomicBool,
}

impl Inner {
    fn check_online(&self) -> DomainResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DomainError::internal(anyhow::anyhow!(
                "in-memory order store is offline"
            )));
        }
        Ok(())
    }

    fn read<R>(&self, f: impl FnOnce(&Table) -> R) -> DomainResult<R> {
        self.check_online()?;
        let rows = self
            .rows
            .read()
            .map_err(|_| DomainError::internal(anyhow::anyhow!("order table lock poisoned")))?;
        Ok(f(&rows))
    }

    fn write<R>(&self, f: impl FnOnce(&mut Table) -> R) -> DomainResult<R> {
        self.check_online()?;
        let mut rows = self
            .rows
            .write()
            .map_err(|_| DomainError::internal(anyhow::anyhow!("order table lock poisoned")))?;
        Ok(f(&mut rows))
    }

    fn next_id(&self) -> i64 {
        self.last_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Order storage held in process memory.
///
/// Ids come from a monotonically increasing sequence starting at 1 and
/// are never reused. Clones share the same table.
///
/// # Example
///
/// ```
/// use everydoc_core::order::Order;
/// use everydoc_core::repository::OrderRepository;
/// use everydoc_testing::InMemoryOrderRepository;
///
/// # tokio_test::block_on(async {
/// let repo = InMemoryOrderRepository::new();
/// let stored = repo.save(Order::new(1, 500, "PENDING")).await.unwrap().unwrap();
/// assert_eq!(stored.id(), Some(1));
/// # });
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryOrderRepository {
    inner: Arc<Inner>,
}

impl InMemoryOrderRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-filled with `orders`, assigning ids in order.
    #[must_use]
    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let repo = Self::new();
        for order in orders {
            repo.insert(order);
        }
        repo
    }

    /// Store `order` immediately under a fresh id and return the stored form.
    ///
    /// Works while offline, so tests can seed a failing store.
    pub fn insert(&self, order: Order) -> Order {
        let id = self.inner.next_id();
        let stored = order.with_id(id);
        self.inner
            .rows
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, stored.clone());
        stored
    }

    /// Number of stored orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read(BTreeMap::len).unwrap_or_default()
    }

    /// `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every subsequent operation fail with an `Internal` error.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    fn query(&self, select: impl FnOnce(&Table) -> Vec<Order> + Send + 'static) -> Many<Order> {
        let inner = Arc::clone(&self.inner);
        Single::new(async move { inner.read(select).map(Some) })
            .into_many()
            .flat_map(Many::from_iterable)
    }

    fn single<T, F>(&self, op: F) -> Single<T>
    where
        T: Send + 'static,
        F: FnOnce(&Inner) -> DomainResult<Option<T>> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        Single::new(async move { op(&inner) })
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn find_all(&self) -> Many<Order> {
        self.query(|rows| rows.values().cloned().collect())
    }

    fn find_by_id(&self, id: i64) -> Single<Order> {
        self.single(move |inner| inner.read(|rows| rows.get(&id).cloned()))
    }

    fn find_by_status(&self, status: &str) -> Many<Order> {
        let status = status.to_owned();
        self.query(move |rows| {
            rows.values()
                .filter(|order| order.status() == status)
                .cloned()
                .collect()
        })
    }

    fn find_by_user_id(&self, user_id: i64) -> Many<Order> {
        self.query(move |rows| {
            rows.values()
                .filter(|order| order.user_id() == user_id)
                .cloned()
                .collect()
        })
    }

    fn save(&self, order: Order) -> Single<Order> {
        self.single(move |inner| {
            let Some(id) = order.id() else {
                let stored = order.with_id(inner.next_id());
                return inner.write(|rows| {
                    rows.insert(stored.id().unwrap_or_default(), stored.clone());
                    Some(stored)
                });
            };
            inner
                .write(|rows| match rows.get_mut(&id) {
                    Some(slot) => {
                        *slot = order.clone();
                        Ok(Some(order))
                    }
                    None => Err(DomainError::not_found(format!("Order not found: {id}"))),
                })?
        })
    }

    fn delete_by_id(&self, id: i64) -> Single<()> {
        self.single(move |inner| {
            inner.write(|rows| {
                rows.remove(&id);
                None
            })
        })
    }

    fn find_by_total_amount_greater_than(&self, amount: i64) -> Many<Order> {
        self.query(move |rows| {
            let mut matching: Vec<Order> = rows
                .values()
                .filter(|order| order.total_amount() > amount)
                .cloned()
                .collect();
            matching.sort_by(|a, b| {
                b.total_amount()
                    .cmp(&a.total_amount())
                    .then_with(|| a.id().cmp(&b.id()))
            });
            matching
        })
    }

    fn sum_amount_by_user_id(&self, user_id: i64) -> Single<i64> {
        self.single(move |inner| {
            inner
                .read(|rows| {
                    rows.values()
                        .filter(|order| order.user_id() == user_id)
                        .try_fold(0_i64, |acc, order| acc.checked_add(order.total_amount()))
                })?
                .map(Some)
                .ok_or_else(|| {
                    DomainError::internal(anyhow::anyhow!("order total overflows i64 for user {user_id}"))
                })
        })
    }

    fn update_status(&self, id: i64, status: &str) -> Single<i32> {
        let status = status.to_owned();
        self.single(move |inner| {
            inner.write(|rows| {
                let Some(order) = rows.remove(&id) else {
                    return Some(0);
                };
                rows.insert(id, order.with_status(status));
                Some(1)
            })
        })
    }
}

impl ReadinessProbe for InMemoryOrderRepository {
    fn ping(&self) -> Single<()> {
        self.single(|inner| inner.check_online().map(|()| None))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use everydoc_core::error::ErrorKind;

    async fn ids(many: Many<Order>) -> Vec<i64> {
        many.collect_list()
            .await
            .unwrap()
            .unwrap()
            .iter()
            .filter_map(Order::id)
            .collect()
    }

    #[tokio::test]
    async fn test_save_assigns_sequential_ids() {
        let repo = InMemoryOrderRepository::new();
        let first = repo.save(Order::new(1, 500, "PENDING")).await.unwrap().unwrap();
        let second = repo.save(Order::new(2, 700, "PAID")).await.unwrap().unwrap();

        assert_eq!(first.id(), Some(1));
        assert_eq!(second.id(), Some(2));
        assert_eq!(first.total_amount(), 500);
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn test_save_is_lazy() {
        let repo = InMemoryOrderRepository::new();
        let pending = repo.save(Order::new(1, 500, "PENDING"));
        assert!(repo.is_empty());
        drop(pending);
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_update_of_unknown_id_is_not_found() {
        let repo = InMemoryOrderRepository::new();
        let err = repo
            .save(Order::new(1, 500, "PENDING").with_id(42))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Order not found: 42");
    }

    #[tokio::test]
    async fn test_queries() {
        let repo = InMemoryOrderRepository::with_orders([
            Order::new(1, 100, "PENDING"),
            Order::new(1, 900, "PAID"),
            Order::new(2, 500, "PENDING"),
        ]);

        assert_eq!(ids(repo.find_all()).await, vec![1, 2, 3]);
        assert_eq!(ids(repo.find_by_status("PENDING")).await, vec![1, 3]);
        assert_eq!(ids(repo.find_by_user_id(1)).await, vec![1, 2]);
        assert_eq!(
            ids(repo.find_by_total_amount_greater_than(100)).await,
            vec![2, 3]
        );
        assert_eq!(repo.sum_amount_by_user_id(1).await.unwrap(), Some(1000));
        assert_eq!(repo.sum_amount_by_user_id(99).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_update_status_and_delete() {
        let repo = InMemoryOrderRepository::with_orders([Order::new(1, 100, "PENDING")]);

        assert_eq!(repo.update_status(1, "PAID").await.unwrap(), Some(1));
        assert_eq!(repo.update_status(2, "PAID").await.unwrap(), Some(0));
        let order = repo.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(order.status(), "PAID");

        assert_eq!(repo.delete_by_id(1).await.unwrap(), None);
        assert_eq!(repo.find_by_id(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_offline_store_fails_internally() {
        let repo = InMemoryOrderRepository::new();
        repo.set_offline(true);

        assert_eq!(repo.ping().await.unwrap_err().kind(), ErrorKind::Internal);
        let err = repo.find_all().collect_list().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);

        repo.set_offline(false);
        assert!(repo.ping().await.is_ok());
    }
}
