use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::expense::{ExpensePaymentMethod, ExpenseStatus};
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    /// Defaults to the calling driver.
    pub driver_id: Option<i64>,
    pub amount: Decimal,
    pub category: String,
    pub description: Option<String>,
    pub payment_method: ExpensePaymentMethod,
    pub expense_date: NaiveDate,
}

impl CreateExpenseRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::positive_money("amount", self.amount)?;
        if self.category.trim().is_empty() {
            return Err(AppError::validation("Category required"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewExpenseRequest {
    pub status: ExpenseStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpenseListQuery {
    pub driver_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub status: Option<ExpenseStatus>,
}
