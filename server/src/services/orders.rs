//! Order use cases over the persistence port.

use everydoc_core::error::DomainError;
use everydoc_core::order::Order;
use everydoc_core::pipeline::{Many, Single};
use everydoc_core::repository::OrderRepository;
use std::sync::Arc;

/// Validates order input and forwards to an [`OrderRepository`].
#[derive(Clone)]
pub struct OrderService {
    repository: Arc<dyn OrderRepository>,
}

impl OrderService {
    /// Create a service over `repository`.
    #[must_use]
    pub fn new(repository: Arc<dyn OrderRepository>) -> Self {
        Self { repository }
    }

    /// Every order.
    pub fn find_all(&self) -> Many<Order> {
        self.repository.find_all()
    }

    /// The order with `id`, or `NotFound`.
    pub fn find_by_id(&self, id: i64) -> Single<Order> {
        self.repository
            .find_by_id(id)
            .or_not_found(format!("Order not found: {id}"))
    }

    /// Orders in `status`.
    pub fn find_by_status(&self, status: &str) -> Many<Order> {
        self.repository.find_by_status(status)
    }

    /// Orders of `user_id`.
    pub fn find_by_user_id(&self, user_id: i64) -> Many<Order> {
        self.repository.find_by_user_id(user_id)
    }

    /// Store `order`, inserting when it has no id.
    ///
    /// Fails with `Validation` for a negative amount or a blank status;
    /// nothing is written in that case.
    pub fn save(&self, order: Order) -> Single<Order> {
        if order.total_amount() < 0 {
            return Single::error(DomainError::validation(format!(
                "totalAmount must not be negative: {}",
                order.total_amount()
            )));
        }
        if order.status().trim().is_empty() {
            return Single::error(DomainError::validation("status must not be blank"));
        }

        self.repository.save(order).do_on_next(|stored| {
            tracing::info!(
                order_id = ?stored.id(),
                user_id = stored.user_id(),
                "Order saved"
            );
        })
    }

    /// Delete order `id` and acknowledge it.
    pub fn delete(&self, id: i64) -> Single<String> {
        self.repository
            .delete_by_id(id)
            .then_return(format!("삭제 완료: id={id}"))
    }

    /// Orders above `amount`, largest first.
    pub fn find_by_amount_greater_than(&self, amount: i64) -> Many<Order> {
        self.repository.find_by_total_amount_greater_than(amount)
    }

    /// Total amount ordered by `user_id`; `0` when there are no orders.
    pub fn sum_amount_by_user_id(&self, user_id: i64) -> Single<i64> {
        self.repository.sum_amount_by_user_id(user_id)
    }

    /// Set the status of order `id` and report how many rows changed.
    pub fn update_status(&self, id: i64, status: &str) -> Single<String> {
        let status = status.to_owned();
        self.repository
            .update_status(id, &status)
            .map(move |affected| {
                format!("업데이트 완료: id={id}, status={status}, 영향받은 행={affected}")
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use everydoc_core::error::ErrorKind;
    use everydoc_testing::{InMemoryOrderRepository, StepVerifier};
    use proptest::prelude::*;

    fn service() -> (InMemoryOrderRepository, OrderService) {
        let repo = InMemoryOrderRepository::with_orders([
            Order::new(1, 500, "PENDING"),
            Order::new(1, 1500, "PAID"),
            Order::new(2, 300, "PENDING"),
        ]);
        (repo.clone(), OrderService::new(Arc::new(repo)))
    }

    #[tokio::test]
    async fn test_find_by_id_missing_is_not_found() {
        let (_, service) = service();

        StepVerifier::create(service.find_by_id(42))
            .expect_error_matches(|e| {
                e.kind() == ErrorKind::NotFound && e.to_string() == "Order not found: 42"
            })
            .verify()
            .await;
    }

    #[tokio::test]
    async fn test_save_assigns_id() {
        let (_, service) = service();

        StepVerifier::create(service.save(Order::new(7, 250, "PENDING")))
            .assert_next(|order| {
                assert_eq!(order.id(), Some(4));
                assert_eq!(order.user_id(), 7);
                assert_eq!(order.total_amount(), 250);
                assert_eq!(order.status(), "PENDING");
            })
            .verify_complete()
            .await;
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_orders_without_writing() {
        let (repo, service) = service();

        StepVerifier::create(service.save(Order::new(1, -1, "PENDING")))
            .verify_error(ErrorKind::Validation)
            .await;
        StepVerifier::create(service.save(Order::new(1, 10, "  ")))
            .verify_error(ErrorKind::Validation)
            .await;

        assert_eq!(repo.len(), 3);
    }

    #[tokio::test]
    async fn test_delete_acknowledges() {
        let (repo, service) = service();

        StepVerifier::create(service.delete(1))
            .expect_next("삭제 완료: id=1".to_string())
            .verify_complete()
            .await;
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn test_update_status_reports_rows() {
        let (_, service) = service();

        StepVerifier::create(service.update_status(2, "SHIPPED"))
            .expect_next("업데이트 완료: id=2, status=SHIPPED, 영향받은 행=1".to_string())
            .verify_complete()
            .await;
        StepVerifier::create(service.update_status(99, "SHIPPED"))
            .expect_next("업데이트 완료: id=99, status=SHIPPED, 영향받은 행=0".to_string())
            .verify_complete()
            .await;
    }

    #[tokio::test]
    async fn test_amount_query_is_descending() {
        let (_, service) = service();

        let amounts: Vec<i64> = service
            .find_by_amount_greater_than(299)
            .map(|order| order.total_amount())
            .collect_list()
            .await
            .unwrap()
            .unwrap();
        assert_eq!(amounts, vec![1500, 500, 300]);
    }

    proptest! {
        #[test]
        fn prop_save_preserves_fields(
            user_id in any::<i64>(),
            amount in 0_i64..1_000_000,
            status in "[A-Z]{1,12}",
        ) {
            let service = OrderService::new(Arc::new(InMemoryOrderRepository::new()));
            let stored = tokio_test::block_on(
                service.save(Order::new(user_id, amount, status.clone())).into_future(),
            )
            .unwrap()
            .unwrap();

            prop_assert!(stored.id().is_some());
            prop_assert_eq!(stored.user_id(), user_id);
            prop_assert_eq!(stored.total_amount(), amount);
            prop_assert_eq!(stored.status(), status.as_str());
        }

        #[test]
        fn prop_resaving_a_found_order_changes_nothing(
            amount in 0_i64..1_000_000,
            status in "[A-Z]{1,12}",
        ) {
            let repo = InMemoryOrderRepository::new();
            let service = OrderService::new(Arc::new(repo.clone()));
            let stored = repo.insert(Order::new(1, amount, status));
            let id = stored.id().unwrap();

            let found = tokio_test::block_on(service.find_by_id(id).into_future())
                .unwrap()
                .unwrap();
            tokio_test::block_on(service.save(found).into_future()).unwrap();

            let after = tokio_test::block_on(service.find_by_id(id).into_future())
                .unwrap()
                .unwrap();
            prop_assert_eq!(after, stored);
            prop_assert_eq!(repo.len(), 1);
        }

        #[test]
        fn prop_sum_for_unknown_user_is_zero(user_id in 1_000_i64..) {
            let (_, service) = service();
            let sum = tokio_test::block_on(service.sum_amount_by_user_id(user_id).into_future())
                .unwrap();
            prop_assert_eq!(sum, Some(0));
        }
    }
}
