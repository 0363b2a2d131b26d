use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgConnection;

use crate::domain::summary::{DayItem, DayOrder, DayWindow};
use crate::models::order::{Order, OrderItem, OrderStatus, PaymentMethod};

const ORDER_COLUMNS: &str = "id, customer_id, driver_id, scheduled_date, status, delivery_charge, \
     discount, total_amount, cash_collected, payment_method, delivered_at, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "id, order_id, product_id, quantity, price_at_time, filled_given, empty_taken, damaged_returned";

/// Item values to persist when an order's items are replaced.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i32,
    pub price_at_time: Decimal,
    pub filled_given: i32,
    pub empty_taken: i32,
    pub damaged_returned: i32,
}

pub async fn fetch(conn: &mut PgConnection, order_id: i64) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
        .bind(order_id)
        .fetch_optional(&mut *conn)
        .await
}

/// Row lock held until the surrounding transaction ends; concurrent
/// completions of the same order queue here.
pub async fn lock(conn: &mut PgConnection, order_id: i64) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
    ))
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn items(conn: &mut PgConnection, order_id: i64) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as::<_, OrderItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id"
    ))
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await
}

/// Replaces all items of the order wholesale.
pub async fn replace_items(
    conn: &mut PgConnection,
    order_id: i64,
    new_items: &[NewOrderItem],
) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query("DELETE FROM order_items WHERE order_id = $1")
        .bind(order_id)
        .execute(&mut *conn)
        .await?;

    let mut written = Vec::with_capacity(new_items.len());
    for item in new_items {
        let row = sqlx::query_as::<_, OrderItem>(&format!(
            r#"INSERT INTO order_items
               (order_id, product_id, quantity, price_at_time, filled_given, empty_taken, damaged_returned)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {ITEM_COLUMNS}"#
        ))
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.price_at_time)
        .bind(item.filled_given)
        .bind(item.empty_taken)
        .bind(item.damaged_returned)
        .fetch_one(&mut *conn)
        .await?;
        written.push(row);
    }
    Ok(written)
}

pub async fn set_pricing(
    conn: &mut PgConnection,
    order_id: i64,
    delivery_charge: Decimal,
    discount: Decimal,
    total_amount: Decimal,
) -> Result<Order, sqlx::Error> {
    sqlx::query_as::<_, Order>(&format!(
        r#"UPDATE orders
           SET delivery_charge = $2, discount = $3, total_amount = $4, updated_at = NOW()
           WHERE id = $1
           RETURNING {ORDER_COLUMNS}"#
    ))
    .bind(order_id)
    .bind(delivery_charge)
    .bind(discount)
    .bind(total_amount)
    .fetch_one(&mut *conn)
    .await
}

pub async fn set_status(
    conn: &mut PgConnection,
    order_id: i64,
    status: OrderStatus,
) -> Result<Order, sqlx::Error> {
    sqlx::query_as::<_, Order>(&format!(
        r#"UPDATE orders SET status = $2, updated_at = NOW()
           WHERE id = $1
           RETURNING {ORDER_COLUMNS}"#
    ))
    .bind(order_id)
    .bind(status)
    .fetch_one(&mut *conn)
    .await
}

pub async fn mark_completed(
    conn: &mut PgConnection,
    order_id: i64,
    cash_collected: Decimal,
    payment_method: PaymentMethod,
    delivered_at: DateTime<Utc>,
) -> Result<Order, sqlx::Error> {
    sqlx::query_as::<_, Order>(&format!(
        r#"UPDATE orders
           SET status = 'COMPLETED', cash_collected = $2, payment_method = $3,
               delivered_at = $4, updated_at = NOW()
           WHERE id = $1
           RETURNING {ORDER_COLUMNS}"#
    ))
    .bind(order_id)
    .bind(cash_collected)
    .bind(payment_method)
    .bind(delivered_at)
    .fetch_one(&mut *conn)
    .await
}

/// All of the driver's orders scheduled inside the window, any status.
pub async fn for_driver_day(
    conn: &mut PgConnection,
    driver_id: i64,
    window: DayWindow,
) -> Result<Vec<DayOrder>, sqlx::Error> {
    sqlx::query_as::<_, DayOrder>(
        r#"SELECT o.id, c.name AS customer_name, o.status, o.payment_method, o.cash_collected
           FROM orders o
           JOIN customers c ON c.id = o.customer_id
           WHERE o.driver_id = $1
             AND o.scheduled_date >= $2
             AND o.scheduled_date < $3
           ORDER BY o.id"#,
    )
    .bind(driver_id)
    .bind(window.start)
    .bind(window.end)
    .fetch_all(&mut *conn)
    .await
}

pub async fn items_for_driver_day(
    conn: &mut PgConnection,
    driver_id: i64,
    window: DayWindow,
) -> Result<Vec<DayItem>, sqlx::Error> {
    sqlx::query_as::<_, DayItem>(
        r#"SELECT oi.order_id, oi.filled_given, oi.empty_taken
           FROM order_items oi
           JOIN orders o ON o.id = oi.order_id
           WHERE o.driver_id = $1
             AND o.scheduled_date >= $2
             AND o.scheduled_date < $3
           ORDER BY oi.id"#,
    )
    .bind(driver_id)
    .bind(window.start)
    .bind(window.end)
    .fetch_all(&mut *conn)
    .await
}
