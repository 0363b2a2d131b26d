use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::cash_handover::HandoverStatus;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct DaySummaryQuery {
    /// Defaults to the calling driver.
    pub driver_id: Option<i64>,
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct SubmitHandoverRequest {
    /// Defaults to the calling driver.
    pub driver_id: Option<i64>,
    pub date: NaiveDate,
    pub actual_cash: Decimal,
    pub driver_notes: Option<String>,
    pub shift_start: Option<DateTime<Utc>>,
    pub shift_end: Option<DateTime<Utc>>,
}

impl SubmitHandoverRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::non_negative_money("actual_cash", self.actual_cash)?;
        if let (Some(start), Some(end)) = (self.shift_start, self.shift_end) {
            if end < start {
                return Err(AppError::validation("shift_end cannot be before shift_start"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyHandoverRequest {
    pub status: HandoverStatus,
    pub admin_notes: Option<String>,
    pub adjustment_amount: Option<Decimal>,
}

impl VerifyHandoverRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(adjustment) = self.adjustment_amount {
            validation::money("adjustment_amount", adjustment)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HandoverListQuery {
    pub status: Option<HandoverStatus>,
    pub driver_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HandoverStatsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
