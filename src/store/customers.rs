use rust_decimal::Decimal;
use sqlx::PgConnection;

use crate::models::customer::Customer;

const CUSTOMER_COLUMNS: &str =
    "id, name, phone, address, cash_balance, credit_limit, created_at";

pub async fn fetch(conn: &mut PgConnection, customer_id: i64) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as::<_, Customer>(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
    ))
    .bind(customer_id)
    .fetch_optional(&mut *conn)
    .await
}

/// Locks the customer row and returns its cached balance.
pub async fn lock_balance(conn: &mut PgConnection, customer_id: i64) -> Result<Option<Decimal>, sqlx::Error> {
    sqlx::query_scalar::<_, Decimal>("SELECT cash_balance FROM customers WHERE id = $1 FOR UPDATE")
        .bind(customer_id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn set_balance(conn: &mut PgConnection, customer_id: i64, balance: Decimal) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE customers SET cash_balance = $2 WHERE id = $1")
        .bind(customer_id)
        .bind(balance)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
