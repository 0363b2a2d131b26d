use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    /// Negative means the customer owes money. Always equals the last ledger entry's `balance_after`.
    pub cash_balance: Decimal,
    pub credit_limit: Decimal,
    pub created_at: DateTime<Utc>,
}

/// One immutable signed change to a customer's cash balance.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LedgerEntry {
    pub id: i64,
    pub customer_id: i64,
    pub seq: i32,
    pub amount: Decimal,
    pub description: String,
    pub balance_after: Decimal,
    pub reference_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
