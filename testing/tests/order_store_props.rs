//! Property tests for the in-memory order store.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use everydoc_core::order::Order;
use everydoc_core::repository::OrderRepository;
use everydoc_testing::{InMemoryOrderRepository, StepVerifier};
use proptest::prelude::*;

fn orders() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((1_i64..5, 0_i64..10_000), 0..20)
}

fn seeded(rows: &[(i64, i64)]) -> InMemoryOrderRepository {
    InMemoryOrderRepository::with_orders(
        rows.iter()
            .map(|&(user_id, amount)| Order::new(user_id, amount, "PENDING")),
    )
}

proptest! {
    #[test]
    fn prop_sum_matches_user_amounts(rows in orders(), user_id in 1_i64..6) {
        let repo = seeded(&rows);
        let expected: i64 = rows
            .iter()
            .filter(|(user, _)| *user == user_id)
            .map(|(_, amount)| amount)
            .sum();

        let total = tokio_test::block_on(async { repo.sum_amount_by_user_id(user_id).await });
        prop_assert_eq!(total.unwrap(), Some(expected));
    }

    #[test]
    fn prop_amount_filter_is_strict_and_descending(rows in orders(), min in 0_i64..10_000) {
        let repo = seeded(&rows);

        let found = tokio_test::block_on(async {
            repo.find_by_total_amount_greater_than(min).collect_list().await
        })
        .unwrap()
        .unwrap_or_default();

        prop_assert_eq!(
            found.len(),
            rows.iter().filter(|(_, amount)| *amount > min).count()
        );
        prop_assert!(found.iter().all(|order| order.total_amount() > min));
        prop_assert!(found
            .windows(2)
            .all(|pair| pair[0].total_amount() >= pair[1].total_amount()));
    }

    #[test]
    fn prop_ids_are_never_reused(rows in orders(), deleted in 1_i64..20) {
        let repo = seeded(&rows);

        let next = tokio_test::block_on(async {
            repo.delete_by_id(deleted).await.unwrap();
            repo.save(Order::new(1, 1, "NEW")).await
        })
        .unwrap()
        .unwrap();

        prop_assert_eq!(next.id(), Some(i64::try_from(rows.len()).unwrap() + 1));
    }
}

#[tokio::test]
async fn test_user_orders_arrive_in_id_order() {
    let repo = seeded(&[(1, 300), (2, 50), (1, 100)]);

    StepVerifier::create(repo.find_by_user_id(1))
        .assert_next(|order| assert_eq!(order.id(), Some(1)))
        .assert_next(|order| assert_eq!(order.id(), Some(3)))
        .verify_complete()
        .await;
}

#[tokio::test]
async fn test_status_update_is_visible_to_status_queries() {
    let repo = seeded(&[(1, 300), (2, 50)]);

    StepVerifier::create(repo.update_status(2, "SHIPPED"))
        .expect_next(1)
        .verify_complete()
        .await;
    StepVerifier::create(repo.find_by_status("SHIPPED"))
        .assert_next(|order| assert_eq!(order.user_id(), 2))
        .verify_complete()
        .await;
}
