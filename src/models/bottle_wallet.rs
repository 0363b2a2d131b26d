use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BottleWallet {
    pub customer_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub balance: i32,
    pub updated_at: DateTime<Utc>,
}
