use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgConnection;

use crate::domain::summary::DayExpense;
use crate::models::expense::{Expense, ExpensePaymentMethod, ExpenseStatus};

const EXPENSE_COLUMNS: &str = "id, driver_id, amount, category, description, payment_method, \
     status, expense_date, reviewed_by, reviewed_at, created_at";

pub struct NewExpense<'a> {
    pub driver_id: i64,
    pub amount: Decimal,
    pub category: &'a str,
    pub description: Option<&'a str>,
    pub payment_method: ExpensePaymentMethod,
    pub expense_date: NaiveDate,
}

pub async fn insert(conn: &mut PgConnection, expense: &NewExpense<'_>) -> Result<Expense, sqlx::Error> {
    sqlx::query_as::<_, Expense>(&format!(
        r#"INSERT INTO expenses (driver_id, amount, category, description, payment_method, expense_date)
           VALUES ($1, $2, $3, $4, $5, $6)
           RETURNING {EXPENSE_COLUMNS}"#
    ))
    .bind(expense.driver_id)
    .bind(expense.amount)
    .bind(expense.category)
    .bind(expense.description)
    .bind(expense.payment_method)
    .bind(expense.expense_date)
    .fetch_one(&mut *conn)
    .await
}

pub async fn lock(conn: &mut PgConnection, expense_id: i64) -> Result<Option<Expense>, sqlx::Error> {
    sqlx::query_as::<_, Expense>(&format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = $1 FOR UPDATE"
    ))
    .bind(expense_id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn set_review(
    conn: &mut PgConnection,
    expense_id: i64,
    status: ExpenseStatus,
    reviewed_by: i64,
) -> Result<Expense, sqlx::Error> {
    sqlx::query_as::<_, Expense>(&format!(
        r#"UPDATE expenses SET status = $2, reviewed_by = $3, reviewed_at = NOW()
           WHERE id = $1
           RETURNING {EXPENSE_COLUMNS}"#
    ))
    .bind(expense_id)
    .bind(status)
    .bind(reviewed_by)
    .fetch_one(&mut *conn)
    .await
}

pub async fn list(
    conn: &mut PgConnection,
    driver_id: Option<i64>,
    expense_date: Option<NaiveDate>,
    status: Option<ExpenseStatus>,
) -> Result<Vec<Expense>, sqlx::Error> {
    sqlx::query_as::<_, Expense>(&format!(
        r#"SELECT {EXPENSE_COLUMNS} FROM expenses
           WHERE ($1::BIGINT IS NULL OR driver_id = $1)
             AND ($2::DATE IS NULL OR expense_date = $2)
             AND ($3::expense_status IS NULL OR status = $3)
           ORDER BY expense_date DESC, id DESC"#
    ))
    .bind(driver_id)
    .bind(expense_date)
    .bind(status)
    .fetch_all(&mut *conn)
    .await
}

pub async fn for_driver_day(
    conn: &mut PgConnection,
    driver_id: i64,
    expense_date: NaiveDate,
) -> Result<Vec<DayExpense>, sqlx::Error> {
    sqlx::query_as::<_, DayExpense>(
        r#"SELECT amount, payment_method, status
           FROM expenses
           WHERE driver_id = $1 AND expense_date = $2
           ORDER BY id"#,
    )
    .bind(driver_id)
    .bind(expense_date)
    .fetch_all(&mut *conn)
    .await
}
