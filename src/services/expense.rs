//! Driver expense log. Cash-on-hand expenses feed the expected-cash figure.

use sqlx::PgPool;
use tracing::info;

use crate::dtos::expense::{CreateExpenseRequest, ExpenseListQuery, ReviewExpenseRequest};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::expense::{Expense, ExpenseStatus};
use crate::store::expenses::{self, NewExpense};
use crate::store::users;

pub async fn create(pool: &PgPool, auth: &AuthContext, req: &CreateExpenseRequest) -> Result<Expense, AppError> {
    req.validate()?;
    let driver_id = req.driver_id.unwrap_or(auth.user_id);
    auth.require_self_or_admin(driver_id, "log expenses")?;

    let mut conn = pool.acquire().await?;
    users::fetch_active_driver(&mut conn, driver_id)
        .await?
        .ok_or_else(|| AppError::not_found("Driver not found"))?;

    let expense = expenses::insert(
        &mut conn,
        &NewExpense {
            driver_id,
            amount: req.amount,
            category: req.category.trim(),
            description: req.description.as_deref(),
            payment_method: req.payment_method,
            expense_date: req.expense_date,
        },
    )
    .await?;

    info!(expense_id = expense.id, driver_id, amount = %expense.amount, "Expense logged");
    Ok(expense)
}

/// PENDING -> APPROVED | REJECTED, once.
pub async fn review(
    pool: &PgPool,
    auth: &AuthContext,
    expense_id: i64,
    req: &ReviewExpenseRequest,
) -> Result<Expense, AppError> {
    auth.require_admin("review expenses")?;
    if req.status == ExpenseStatus::Pending {
        return Err(AppError::validation("Review status must be APPROVED or REJECTED"));
    }

    let mut tx = pool.begin().await?;
    let current = expenses::lock(&mut tx, expense_id)
        .await?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;
    if current.status != ExpenseStatus::Pending {
        return Err(AppError::invalid_transition("Only pending expenses can be reviewed"));
    }

    let expense = expenses::set_review(&mut tx, expense_id, req.status, auth.user_id).await?;
    tx.commit().await?;

    info!(expense_id, status = ?expense.status, reviewed_by = auth.user_id, "Expense reviewed");
    Ok(expense)
}

pub async fn list(pool: &PgPool, auth: &AuthContext, query: ExpenseListQuery) -> Result<Vec<Expense>, AppError> {
    let driver_id = if auth.is_admin() { query.driver_id } else { Some(auth.user_id) };
    let mut conn = pool.acquire().await?;
    Ok(expenses::list(&mut conn, driver_id, query.date, query.status).await?)
}
