#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};

use aquaflow_backend::middleware::auth::AuthContext;
use aquaflow_backend::models::user::Role;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Connects to `TEST_DATABASE_URL` and migrates it. Returns `None` (and the
/// test skips) when the variable is not set.
pub async fn test_pool() -> Option<PgPool> {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL not set; skipping");
            return None;
        }
    };
    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(&url)
        .await
        .expect("connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    Some(pool)
}

/// Unique suffix so tests sharing one database do not collide.
pub fn unique(prefix: &str) -> String {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{prefix}-{}-{nanos}-{n}", std::process::id())
}

pub async fn create_user(pool: &PgPool, role: Role) -> AuthContext {
    let username = unique(role.as_str());
    let id: i64 = sqlx::query_scalar("INSERT INTO users (username, role) VALUES ($1, $2) RETURNING id")
        .bind(&username)
        .bind(role.as_str())
        .fetch_one(pool)
        .await
        .expect("insert user");
    AuthContext { user_id: id, role, username }
}

pub async fn create_customer(pool: &PgPool) -> i64 {
    sqlx::query_scalar("INSERT INTO customers (name, phone) VALUES ($1, '0770000000') RETURNING id")
        .bind(unique("customer"))
        .fetch_one(pool)
        .await
        .expect("insert customer")
}

pub async fn create_product(pool: &PgPool, price: Decimal, stock_filled: i32) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO products (name, price, stock_filled) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(unique("19L bottle"))
    .bind(price)
    .bind(stock_filled)
    .fetch_one(pool)
    .await
    .expect("insert product")
}

/// An order with one line `quantity x price`, total = quantity * price.
pub async fn create_order(
    pool: &PgPool,
    customer_id: i64,
    driver_id: i64,
    product_id: i64,
    quantity: i32,
    price: Decimal,
    scheduled: DateTime<Utc>,
) -> i64 {
    let total = Decimal::from(quantity) * price;
    let order_id: i64 = sqlx::query_scalar(
        r#"INSERT INTO orders (customer_id, driver_id, scheduled_date, total_amount)
           VALUES ($1, $2, $3, $4) RETURNING id"#,
    )
    .bind(customer_id)
    .bind(driver_id)
    .bind(scheduled)
    .bind(total)
    .fetch_one(pool)
    .await
    .expect("insert order");

    sqlx::query(
        "INSERT INTO order_items (order_id, product_id, quantity, price_at_time) VALUES ($1, $2, $3, $4)",
    )
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .bind(price)
    .execute(pool)
    .await
    .expect("insert order item");

    order_id
}

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

pub fn midday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 10, 30, 0).unwrap()
}

pub fn json<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
    serde_json::from_value(value).expect("valid request body")
}
