use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "handover_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandoverStatus {
    Pending,
    Verified,
    Rejected,
    Adjusted,
}

impl HandoverStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HandoverStatus::Pending => "PENDING",
            HandoverStatus::Verified => "VERIFIED",
            HandoverStatus::Rejected => "REJECTED",
            HandoverStatus::Adjusted => "ADJUSTED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CashHandover {
    pub id: i64,
    pub driver_id: i64,
    pub handover_date: NaiveDate,
    pub expected_cash: Decimal,
    pub actual_cash: Decimal,
    /// expected_cash - actual_cash; positive is a shortage.
    pub discrepancy: Decimal,
    pub status: HandoverStatus,
    pub driver_notes: Option<String>,
    pub shift_start: Option<DateTime<Utc>>,
    pub shift_end: Option<DateTime<Utc>>,

    // Day snapshot taken at submission
    pub total_orders: i32,
    pub completed_orders: i32,
    pub cash_orders: i32,
    pub gross_cash: Decimal,
    pub expenses_amount: Decimal,
    pub bottles_given: i32,
    pub bottles_taken: i32,

    pub admin_notes: Option<String>,
    pub adjustment_amount: Option<Decimal>,
    pub verified_by: Option<i64>,
    pub verified_at: Option<DateTime<Utc>>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
