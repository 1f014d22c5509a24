//! Order placement against a real SQLite database.
//!
//! Run with: cargo test --test orders_sqlite --features sqlite

mod common;

use chrono::{TimeDelta, Utc};
use uuid::Uuid;

use coffeehouse::domain::{CartLine, Money, OrderStatus};
use coffeehouse::orders::OrderError;

use common::Harness;

fn line(product_id: Uuid, quantity: i64) -> CartLine {
    CartLine {
        product_id,
        quantity,
    }
}

#[tokio::test]
async fn test_total_is_sum_of_snapshots_after_reload() {
    let h = Harness::new().await;
    let customer = h.customer("ada@example.com").await;
    let americano = h.product("Americano", 350).await;
    let croissant = h.product("Croissant", 500).await;

    let placed = h
        .state
        .orders
        .place_order(
            customer.id,
            &[line(americano.id, 2), line(croissant.id, 1)],
            Some("extra hot".to_string()),
        )
        .await
        .expect("order should be placed");

    assert_eq!(placed.total, Money::from_minor(1200));
    assert_eq!(placed.status, OrderStatus::Pending);
    assert_eq!(placed.lines[0].unit_price, Money::from_minor(350));
    assert_eq!(placed.lines[1].unit_price, Money::from_minor(500));

    let reloaded = h.state.orders.get_order(placed.id).await.unwrap();
    assert_eq!(reloaded, placed);
    assert!(reloaded.is_consistent());
    assert_eq!(reloaded.note.as_deref(), Some("extra hot"));
}

#[tokio::test]
async fn test_lines_keep_submission_order() {
    let h = Harness::new().await;
    let customer = h.customer("order@example.com").await;
    let mut ids = Vec::new();
    for (name, price) in [("Mocha", 450), ("Cortado", 300), ("Bagel", 275), ("Chai", 380)] {
        ids.push(h.product(name, price).await.id);
    }
    let cart: Vec<CartLine> = ids.iter().rev().map(|id| line(*id, 1)).collect();

    let placed = h
        .state
        .orders
        .place_order(customer.id, &cart, None)
        .await
        .unwrap();
    let reloaded = h.state.orders.get_order(placed.id).await.unwrap();

    let product_ids: Vec<Uuid> = reloaded.lines.iter().map(|l| l.product_id).collect();
    let expected: Vec<Uuid> = ids.into_iter().rev().collect();
    assert_eq!(product_ids, expected);
}

#[tokio::test]
async fn test_snapshot_survives_price_change() {
    let h = Harness::new().await;
    let customer = h.customer("snap@example.com").await;
    let latte = h.product("Latte", 400).await;

    let placed = h
        .state
        .orders
        .place_order(customer.id, &[line(latte.id, 1)], None)
        .await
        .unwrap();

    h.state
        .catalog
        .update_product(
            latte.id,
            coffeehouse::domain::ProductUpdate {
                price: Some(Money::from_minor(999)),
                name: Some("Grande Latte".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let reloaded = h.state.orders.get_order(placed.id).await.unwrap();
    assert_eq!(reloaded.lines[0].unit_price, Money::from_minor(400));
    assert_eq!(reloaded.lines[0].product_name, "Latte");
    assert_eq!(reloaded.total, Money::from_minor(400));
}

#[tokio::test]
async fn test_unknown_product_persists_nothing() {
    let h = Harness::new().await;
    let customer = h.customer("unknown@example.com").await;
    let espresso = h.product("Espresso", 250).await;
    let missing = Uuid::new_v4();

    let err = h
        .state
        .orders
        .place_order(customer.id, &[line(espresso.id, 1), line(missing, 1)], None)
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::UnknownProduct { product_id } if product_id == missing));
    assert_eq!(h.row_count("orders").await, 0);
    assert_eq!(h.row_count("order_items").await, 0);
}

#[tokio::test]
async fn test_inactive_product_is_unavailable() {
    let h = Harness::new().await;
    let customer = h.customer("inactive@example.com").await;
    let seasonal = h.product("Pumpkin Spice", 550).await;
    h.state.catalog.deactivate(seasonal.id).await.unwrap();

    let err = h
        .state
        .orders
        .place_order(customer.id, &[line(seasonal.id, 1)], None)
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::ProductUnavailable { .. }));
    assert_eq!(h.row_count("orders").await, 0);
}

#[tokio::test]
async fn test_non_positive_quantity_rejected() {
    let h = Harness::new().await;
    let customer = h.customer("qty@example.com").await;
    let flat_white = h.product("Flat White", 380).await;

    for quantity in [0, -3] {
        let err = h
            .state
            .orders
            .place_order(customer.id, &[line(flat_white.id, quantity)], None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidQuantity { quantity: q, .. } if q == quantity));
    }
    assert_eq!(h.row_count("orders").await, 0);
}

#[tokio::test]
async fn test_failed_line_write_rolls_back_whole_order() {
    let h = Harness::new().await;
    let customer = h.customer("atomic@example.com").await;
    let a = h.product("Americano", 350).await;
    let b = h.product("Croissant", 500).await;

    // The header and the first line are written, then the second line fails.
    sqlx::query(
        "CREATE TRIGGER fail_second_line BEFORE INSERT ON order_items \
         WHEN NEW.position = 1 \
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END",
    )
    .execute(&h.pool)
    .await
    .unwrap();

    let err = h
        .state
        .orders
        .place_order(customer.id, &[line(a.id, 2), line(b.id, 1)], None)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::CommitFailed { .. }), "got {err:?}");

    assert_eq!(h.row_count("orders").await, 0);
    assert_eq!(h.row_count("order_items").await, 0);
    assert!(h
        .state
        .orders
        .orders_for_customer(customer.id)
        .await
        .unwrap()
        .is_empty());

    sqlx::query("DROP TRIGGER fail_second_line")
        .execute(&h.pool)
        .await
        .unwrap();
    h.state
        .orders
        .place_order(customer.id, &[line(a.id, 1), line(b.id, 1)], None)
        .await
        .expect("order should commit once the failure is removed");
    assert_eq!(h.row_count("orders").await, 1);
    assert_eq!(h.row_count("order_items").await, 2);
}

#[tokio::test]
async fn test_status_compare_and_swap() {
    let h = Harness::new().await;
    let customer = h.customer("cas@example.com").await;
    let mocha = h.product("Mocha", 450).await;
    let order = h
        .state
        .orders
        .place_order(customer.id, &[line(mocha.id, 1)], None)
        .await
        .unwrap();

    let confirmed = h
        .state
        .orders
        .transition(order.id, OrderStatus::Confirmed, Some(OrderStatus::Pending))
        .await
        .unwrap();
    assert_eq!(confirmed.status, OrderStatus::Confirmed);
    assert!(confirmed.updated_at >= order.updated_at);

    // Second writer acting on the same stale read.
    let err = h
        .state
        .orders
        .transition(order.id, OrderStatus::Confirmed, Some(OrderStatus::Pending))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::InvalidTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Confirmed
        }
    ));

    let reloaded = h.state.orders.get_order(order.id).await.unwrap();
    assert_eq!(reloaded.status, OrderStatus::Confirmed);
}

#[tokio::test]
async fn test_concurrent_transitions_have_one_winner() {
    let h = Harness::new().await;
    let customer = h.customer("race@example.com").await;
    let chai = h.product("Chai", 380).await;
    let order = h
        .state
        .orders
        .place_order(customer.id, &[line(chai.id, 1)], None)
        .await
        .unwrap();

    let orders = h.state.orders.clone();
    let (first, second) = tokio::join!(
        orders.transition(order.id, OrderStatus::Confirmed, None),
        orders.transition(order.id, OrderStatus::Cancelled, Some(OrderStatus::Pending)),
    );

    let wins = [first.is_ok(), second.is_ok()];
    assert_eq!(wins.iter().filter(|w| **w).count(), 1, "{first:?} / {second:?}");
    let loser = if first.is_ok() { second } else { first };
    assert!(matches!(loser, Err(OrderError::InvalidTransition { .. })));
}

#[tokio::test]
async fn test_full_lifecycle_then_terminal() {
    let h = Harness::new().await;
    let customer = h.customer("life@example.com").await;
    let latte = h.product("Latte", 400).await;
    let order = h
        .state
        .orders
        .place_order(customer.id, &[line(latte.id, 1)], None)
        .await
        .unwrap();

    for next in [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
    ] {
        let order = h.state.orders.transition(order.id, next, None).await.unwrap();
        assert_eq!(order.status, next);
    }

    for to in OrderStatus::ALL {
        let err = h
            .state
            .orders
            .transition(order.id, to, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Completed,
                ..
            }
        ));
    }
}

#[tokio::test]
async fn test_transition_of_missing_order() {
    let h = Harness::new().await;
    let err = h
        .state
        .orders
        .transition(Uuid::new_v4(), OrderStatus::Confirmed, None)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::NotFound { .. }));
}

#[tokio::test]
async fn test_customer_without_orders_gets_empty_list() {
    let h = Harness::new().await;
    let customer = h.customer("new@example.com").await;
    let orders = h
        .state
        .orders
        .orders_for_customer(customer.id)
        .await
        .unwrap();
    assert!(orders.is_empty());

    let stranger = h
        .state
        .orders
        .orders_for_customer(Uuid::new_v4())
        .await
        .unwrap();
    assert!(stranger.is_empty());
}

#[tokio::test]
async fn test_queries_by_customer_status_and_day() {
    let h = Harness::new().await;
    let ada = h.customer("ada@example.com").await;
    let bob = h.customer("bob@example.com").await;
    let espresso = h.product("Espresso", 250).await;

    let first = h
        .state
        .orders
        .place_order(ada.id, &[line(espresso.id, 1)], None)
        .await
        .unwrap();
    let second = h
        .state
        .orders
        .place_order(ada.id, &[line(espresso.id, 2)], None)
        .await
        .unwrap();
    h.state
        .orders
        .place_order(bob.id, &[line(espresso.id, 3)], None)
        .await
        .unwrap();
    h.state
        .orders
        .transition(first.id, OrderStatus::Confirmed, None)
        .await
        .unwrap();

    let ada_orders = h.state.orders.orders_for_customer(ada.id).await.unwrap();
    assert_eq!(ada_orders.len(), 2);
    assert!(ada_orders.iter().all(|o| o.customer_id == ada.id));

    let pending = h
        .state
        .orders
        .orders_with_status(OrderStatus::Pending)
        .await
        .unwrap();
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().any(|o| o.id == second.id));

    let today = h.state.orders.orders_today().await.unwrap();
    assert_eq!(today.len(), 3);
    assert_eq!(h.state.orders.count_orders().await.unwrap(), 3);
}

#[tokio::test]
async fn test_orders_from_other_days_are_not_today() {
    let h = Harness::new().await;
    let customer = h.customer("yesterday@example.com").await;
    let bagel = h.product("Bagel", 275).await;
    let order = h
        .state
        .orders
        .place_order(customer.id, &[line(bagel.id, 1)], None)
        .await
        .unwrap();

    let two_days_ago = Utc::now() - TimeDelta::days(2);
    sqlx::query("UPDATE orders SET created_at = ? WHERE id = ?")
        .bind(coffeehouse::storage::schema::timestamp(two_days_ago))
        .bind(order.id.to_string())
        .execute(&h.pool)
        .await
        .unwrap();

    assert!(h.state.orders.orders_today().await.unwrap().is_empty());
    assert_eq!(h.state.orders.count_orders().await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_removes_order_and_lines() {
    let h = Harness::new().await;
    let customer = h.customer("delete@example.com").await;
    let a = h.product("Americano", 350).await;
    let b = h.product("Croissant", 500).await;
    let order = h
        .state
        .orders
        .place_order(customer.id, &[line(a.id, 1), line(b.id, 1)], None)
        .await
        .unwrap();

    h.state.orders.delete_order(order.id).await.unwrap();
    assert_eq!(h.row_count("orders").await, 0);
    assert_eq!(h.row_count("order_items").await, 0);

    let err = h.state.orders.delete_order(order.id).await.unwrap_err();
    assert!(matches!(err, OrderError::NotFound { .. }));
}

#[tokio::test]
async fn test_unknown_customer_rejected() {
    let h = Harness::new().await;
    let espresso = h.product("Espresso", 250).await;
    let err = h
        .state
        .orders
        .place_order(Uuid::new_v4(), &[line(espresso.id, 1)], None)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::UnknownCustomer { .. }));
}
