use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgConnection;

use crate::domain::handover::Verification;
use crate::domain::summary::DaySummary;
use crate::models::cash_handover::{CashHandover, HandoverStatus};

const HANDOVER_COLUMNS: &str = "id, driver_id, handover_date, expected_cash, actual_cash, discrepancy, \
     status, driver_notes, shift_start, shift_end, total_orders, completed_orders, cash_orders, \
     gross_cash, expenses_amount, bottles_given, bottles_taken, admin_notes, adjustment_amount, \
     verified_by, verified_at, submitted_at, updated_at";

/// Driver-entered fields plus the freshly computed figures of one submission.
pub struct Submission<'a> {
    pub summary: &'a DaySummary,
    pub actual_cash: Decimal,
    pub discrepancy: Decimal,
    pub driver_notes: Option<&'a str>,
    pub shift_start: Option<DateTime<Utc>>,
    pub shift_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct HandoverFilter {
    pub status: Option<HandoverStatus>,
    pub driver_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub async fn fetch(conn: &mut PgConnection, handover_id: i64) -> Result<Option<CashHandover>, sqlx::Error> {
    sqlx::query_as::<_, CashHandover>(&format!(
        "SELECT {HANDOVER_COLUMNS} FROM cash_handovers WHERE id = $1"
    ))
    .bind(handover_id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn lock(conn: &mut PgConnection, handover_id: i64) -> Result<Option<CashHandover>, sqlx::Error> {
    sqlx::query_as::<_, CashHandover>(&format!(
        "SELECT {HANDOVER_COLUMNS} FROM cash_handovers WHERE id = $1 FOR UPDATE"
    ))
    .bind(handover_id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn lock_for_day(
    conn: &mut PgConnection,
    driver_id: i64,
    handover_date: NaiveDate,
) -> Result<Option<CashHandover>, sqlx::Error> {
    sqlx::query_as::<_, CashHandover>(&format!(
        "SELECT {HANDOVER_COLUMNS} FROM cash_handovers \
         WHERE driver_id = $1 AND handover_date = $2 FOR UPDATE"
    ))
    .bind(driver_id)
    .bind(handover_date)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn insert(conn: &mut PgConnection, submission: &Submission<'_>) -> Result<CashHandover, sqlx::Error> {
    let s = submission.summary;
    sqlx::query_as::<_, CashHandover>(&format!(
        r#"INSERT INTO cash_handovers
           (driver_id, handover_date, expected_cash, actual_cash, discrepancy, status,
            driver_notes, shift_start, shift_end, total_orders, completed_orders, cash_orders,
            gross_cash, expenses_amount, bottles_given, bottles_taken)
           VALUES ($1, $2, $3, $4, $5, 'PENDING', $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
           RETURNING {HANDOVER_COLUMNS}"#
    ))
    .bind(s.driver_id)
    .bind(s.date)
    .bind(s.expected_cash)
    .bind(submission.actual_cash)
    .bind(submission.discrepancy)
    .bind(submission.driver_notes)
    .bind(submission.shift_start)
    .bind(submission.shift_end)
    .bind(s.total_orders)
    .bind(s.completed_orders)
    .bind(s.cash_orders)
    .bind(s.gross_cash)
    .bind(s.expenses_amount)
    .bind(s.bottles_given)
    .bind(s.bottles_taken)
    .fetch_one(&mut *conn)
    .await
}

/// Full overwrite of a PENDING handover. Returns `None` if it is no longer PENDING.
pub async fn overwrite_pending(
    conn: &mut PgConnection,
    handover_id: i64,
    submission: &Submission<'_>,
) -> Result<Option<CashHandover>, sqlx::Error> {
    let s = submission.summary;
    sqlx::query_as::<_, CashHandover>(&format!(
        r#"UPDATE cash_handovers
           SET expected_cash = $2, actual_cash = $3, discrepancy = $4,
               driver_notes = $5, shift_start = $6, shift_end = $7,
               total_orders = $8, completed_orders = $9, cash_orders = $10,
               gross_cash = $11, expenses_amount = $12,
               bottles_given = $13, bottles_taken = $14,
               submitted_at = NOW(), updated_at = NOW()
           WHERE id = $1 AND status = 'PENDING'
           RETURNING {HANDOVER_COLUMNS}"#
    ))
    .bind(handover_id)
    .bind(s.expected_cash)
    .bind(submission.actual_cash)
    .bind(submission.discrepancy)
    .bind(submission.driver_notes)
    .bind(submission.shift_start)
    .bind(submission.shift_end)
    .bind(s.total_orders)
    .bind(s.completed_orders)
    .bind(s.cash_orders)
    .bind(s.gross_cash)
    .bind(s.expenses_amount)
    .bind(s.bottles_given)
    .bind(s.bottles_taken)
    .fetch_optional(&mut *conn)
    .await
}

/// Applies the one-way verification. Returns `None` if it is no longer PENDING.
pub async fn apply_verification(
    conn: &mut PgConnection,
    handover_id: i64,
    verification: &Verification,
    verified_by: i64,
    admin_notes: Option<&str>,
) -> Result<Option<CashHandover>, sqlx::Error> {
    sqlx::query_as::<_, CashHandover>(&format!(
        r#"UPDATE cash_handovers
           SET status = $2, adjustment_amount = $3, admin_notes = $4,
               verified_by = $5, verified_at = NOW(), updated_at = NOW()
           WHERE id = $1 AND status = 'PENDING'
           RETURNING {HANDOVER_COLUMNS}"#
    ))
    .bind(handover_id)
    .bind(verification.status)
    .bind(verification.adjustment_amount)
    .bind(admin_notes)
    .bind(verified_by)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn list(conn: &mut PgConnection, filter: &HandoverFilter) -> Result<Vec<CashHandover>, sqlx::Error> {
    sqlx::query_as::<_, CashHandover>(&format!(
        r#"SELECT {HANDOVER_COLUMNS} FROM cash_handovers
           WHERE ($1::handover_status IS NULL OR status = $1)
             AND ($2::BIGINT IS NULL OR driver_id = $2)
             AND ($3::DATE IS NULL OR handover_date >= $3)
             AND ($4::DATE IS NULL OR handover_date <= $4)
           ORDER BY handover_date DESC, id DESC"#
    ))
    .bind(filter.status)
    .bind(filter.driver_id)
    .bind(filter.start_date)
    .bind(filter.end_date)
    .fetch_all(&mut *conn)
    .await
}
