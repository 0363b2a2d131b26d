mod common;

use aquaflow_backend::dtos::order::{ReplaceOrderItemsRequest, UpdateOrderStatusRequest};
use aquaflow_backend::error::AppError;
use aquaflow_backend::models::order::OrderStatus;
use aquaflow_backend::models::user::Role;
use aquaflow_backend::services::{customer, fulfillment};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use common::*;

async fn balance(pool: &sqlx::PgPool, customer_id: i64) -> Decimal {
    sqlx::query_scalar("SELECT cash_balance FROM customers WHERE id = $1")
        .bind(customer_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn ledger_count(pool: &sqlx::PgPool, customer_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM ledger_entries WHERE customer_id = $1")
        .bind(customer_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn completing_a_paid_cash_order_moves_money_bottles_and_stock() {
    let Some(pool) = test_pool().await else { return };
    let driver = create_user(&pool, Role::Driver).await;
    let customer_id = create_customer(&pool).await;
    let product_id = create_product(&pool, dec!(300), 10).await;
    let order_id = create_order(&pool, customer_id, driver.user_id, product_id, 2, dec!(300), midday()).await;

    let req: UpdateOrderStatusRequest = json(json!({
        "status": "COMPLETED",
        "cash_collected": "600",
        "payment_method": "CASH",
        "items": [{ "product_id": product_id, "quantity": 2, "filled_given": 2, "empty_taken": 2 }]
    }));
    let done = fulfillment::update_status(&pool, &driver, order_id, &req).await.unwrap();
    assert_eq!(done.order.status, OrderStatus::Completed);
    assert_eq!(done.order.total_amount, dec!(600));
    assert!(done.order.delivered_at.is_some());

    let statement = customer::statement(&pool, customer_id).await.unwrap();
    assert!(statement.chain_valid);
    let amounts: Vec<Decimal> = statement.entries.iter().map(|e| e.amount).collect();
    assert_eq!(amounts, vec![dec!(-600), dec!(600)]);
    assert_eq!(statement.entries[0].description, format!("Order #{order_id} Sale"));
    assert_eq!(statement.customer.cash_balance, Decimal::ZERO);

    let wallets = customer::bottle_wallets(&pool, customer_id).await.unwrap();
    assert_eq!(wallets.len(), 1);
    assert_eq!(wallets[0].balance, 0);

    let (filled, empty): (i32, i32) =
        sqlx::query_as("SELECT stock_filled, stock_empty FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!((filled, empty), (8, 2));
}

#[tokio::test]
async fn unpaid_completion_leaves_a_debt() {
    let Some(pool) = test_pool().await else { return };
    let driver = create_user(&pool, Role::Driver).await;
    let customer_id = create_customer(&pool).await;
    let product_id = create_product(&pool, dec!(125), 10).await;
    let order_id = create_order(&pool, customer_id, driver.user_id, product_id, 2, dec!(125), midday()).await;

    let req: UpdateOrderStatusRequest = json(json!({ "status": "COMPLETED", "payment_method": "CREDIT" }));
    fulfillment::update_status(&pool, &driver, order_id, &req).await.unwrap();

    assert_eq!(balance(&pool, customer_id).await, dec!(-250));
    assert_eq!(ledger_count(&pool, customer_id).await, 1);
}

#[tokio::test]
async fn completion_side_effects_apply_exactly_once() {
    let Some(pool) = test_pool().await else { return };
    let driver = create_user(&pool, Role::Driver).await;
    let customer_id = create_customer(&pool).await;
    let product_id = create_product(&pool, dec!(100), 10).await;
    let order_id = create_order(&pool, customer_id, driver.user_id, product_id, 1, dec!(100), midday()).await;

    let req: UpdateOrderStatusRequest = json(json!({ "status": "COMPLETED", "cash_collected": "40" }));

    let (a, b) = tokio::join!(
        fulfillment::update_status(&pool, &driver, order_id, &req),
        fulfillment::update_status(&pool, &driver, order_id, &req),
    );
    assert!(a.is_ok() && b.is_ok());

    // A later retry is a no-op as well.
    fulfillment::update_status(&pool, &driver, order_id, &req).await.unwrap();

    assert_eq!(ledger_count(&pool, customer_id).await, 2);
    assert_eq!(balance(&pool, customer_id).await, dec!(-60));
    let statement = customer::statement(&pool, customer_id).await.unwrap();
    assert!(statement.chain_valid);
}

#[tokio::test]
async fn completed_orders_cannot_be_reopened() {
    let Some(pool) = test_pool().await else { return };
    let driver = create_user(&pool, Role::Driver).await;
    let customer_id = create_customer(&pool).await;
    let product_id = create_product(&pool, dec!(50), 5).await;
    let order_id = create_order(&pool, customer_id, driver.user_id, product_id, 1, dec!(50), midday()).await;

    let complete: UpdateOrderStatusRequest = json(json!({ "status": "COMPLETED" }));
    fulfillment::update_status(&pool, &driver, order_id, &complete).await.unwrap();

    let reopen: UpdateOrderStatusRequest = json(json!({ "status": "PENDING" }));
    let err = fulfillment::update_status(&pool, &driver, order_id, &reopen).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition(_)));
}

#[tokio::test]
async fn drivers_cannot_touch_other_drivers_orders() {
    let Some(pool) = test_pool().await else { return };
    let owner = create_user(&pool, Role::Driver).await;
    let other = create_user(&pool, Role::Driver).await;
    let customer_id = create_customer(&pool).await;
    let product_id = create_product(&pool, dec!(50), 5).await;
    let order_id = create_order(&pool, customer_id, owner.user_id, product_id, 1, dec!(50), midday()).await;

    let req: UpdateOrderStatusRequest = json(json!({ "status": "IN_PROGRESS" }));
    let err = fulfillment::update_status(&pool, &other, order_id, &req).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(ledger_count(&pool, customer_id).await, 0);
}

#[tokio::test]
async fn item_edits_reprice_open_orders_only() {
    let Some(pool) = test_pool().await else { return };
    let driver = create_user(&pool, Role::Driver).await;
    let customer_id = create_customer(&pool).await;
    let product_id = create_product(&pool, dec!(150), 10).await;
    let order_id = create_order(&pool, customer_id, driver.user_id, product_id, 1, dec!(150), midday()).await;

    // Catalogue price moves; the order keeps its snapshot.
    sqlx::query("UPDATE products SET price = 175 WHERE id = $1")
        .bind(product_id)
        .execute(&pool)
        .await
        .unwrap();

    let edit: ReplaceOrderItemsRequest = json(json!({
        "items": [{ "product_id": product_id, "quantity": 3 }],
        "delivery_charge": "20",
        "discount": "10",
    }));
    let edited = fulfillment::replace_items(&pool, &driver, order_id, &edit).await.unwrap();
    assert_eq!(edited.items[0].price_at_time, dec!(150));
    assert_eq!(edited.order.total_amount, dec!(460));

    let complete: UpdateOrderStatusRequest = json(json!({ "status": "COMPLETED", "cash_collected": "460" }));
    fulfillment::update_status(&pool, &driver, order_id, &complete).await.unwrap();
    assert_eq!(balance(&pool, customer_id).await, Decimal::ZERO);

    let err = fulfillment::replace_items(&pool, &driver, order_id, &edit).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition(_)));
}

#[tokio::test]
async fn stock_out_of_range_rolls_back_the_completion() {
    let Some(pool) = test_pool().await else { return };
    let driver = create_user(&pool, Role::Driver).await;
    let customer_id = create_customer(&pool).await;
    let product_id = create_product(&pool, dec!(10), i32::MIN + 5).await;
    let order_id = create_order(&pool, customer_id, driver.user_id, product_id, 1, dec!(10), midday()).await;

    let req: UpdateOrderStatusRequest = json(json!({
        "status": "COMPLETED",
        "cash_collected": "10",
        "items": [{ "product_id": product_id, "quantity": 1, "filled_given": 10 }]
    }));
    let err = fulfillment::update_status(&pool, &driver, order_id, &req).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    assert_eq!(ledger_count(&pool, customer_id).await, 0);
    assert_eq!(balance(&pool, customer_id).await, Decimal::ZERO);
    let order = fulfillment::get_order(&pool, &driver, order_id).await.unwrap();
    assert_eq!(order.order.status, OrderStatus::Scheduled);
}

#[tokio::test]
async fn concurrent_completions_for_one_customer_keep_the_chain() {
    let Some(pool) = test_pool().await else { return };
    let driver = create_user(&pool, Role::Driver).await;
    let customer_id = create_customer(&pool).await;
    let product_id = create_product(&pool, dec!(100), 20).await;
    let first = create_order(&pool, customer_id, driver.user_id, product_id, 1, dec!(100), midday()).await;
    let second = create_order(&pool, customer_id, driver.user_id, product_id, 2, dec!(100), midday()).await;

    let pay_first: UpdateOrderStatusRequest = json(json!({
        "status": "COMPLETED",
        "cash_collected": "100",
        "items": [{ "product_id": product_id, "quantity": 1, "filled_given": 1, "empty_taken": 1 }]
    }));
    let pay_second: UpdateOrderStatusRequest = json(json!({
        "status": "COMPLETED",
        "cash_collected": "50",
        "items": [{ "product_id": product_id, "quantity": 2, "filled_given": 2 }]
    }));

    let (a, b) = tokio::join!(
        fulfillment::update_status(&pool, &driver, first, &pay_first),
        fulfillment::update_status(&pool, &driver, second, &pay_second),
    );
    a.unwrap();
    b.unwrap();

    let statement = customer::statement(&pool, customer_id).await.unwrap();
    assert!(statement.chain_valid);
    let seqs: Vec<i32> = statement.entries.iter().map(|e| e.seq).collect();
    assert_eq!(seqs, vec![1, 2, 3, 4]);
    assert_eq!(statement.customer.cash_balance, dec!(-150));
    assert_eq!(statement.entries[3].balance_after, dec!(-150));

    let wallets = customer::bottle_wallets(&pool, customer_id).await.unwrap();
    assert_eq!(wallets[0].balance, 2);
}
