//! End-of-day cash handover: expected-cash preview, driver submission and
//! admin verification.

use chrono::{FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument, warn};

use crate::domain::handover::{decide_submit, discrepancy, plan_verification, HandoverStats, SubmitAction};
use crate::domain::summary::{DaySummary, DayWindow};
use crate::dtos::cash_handover::{HandoverListQuery, HandoverStatsQuery, SubmitHandoverRequest, VerifyHandoverRequest};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::cash_handover::CashHandover;
use crate::store::handovers::{self, HandoverFilter, Submission};
use crate::store::{expenses, orders, users};
use crate::validation;

/// Always recomputed from the store; nothing is cached.
pub async fn compute_day_summary(
    conn: &mut PgConnection,
    driver_id: i64,
    date: NaiveDate,
    offset: FixedOffset,
) -> Result<DaySummary, AppError> {
    let window = DayWindow::for_date(date, offset)?;
    let day_orders = orders::for_driver_day(conn, driver_id, window).await?;
    let day_items = orders::items_for_driver_day(conn, driver_id, window).await?;
    let day_expenses = expenses::for_driver_day(conn, driver_id, date).await?;
    DaySummary::compute(driver_id, date, &day_orders, &day_items, &day_expenses)
}

async fn ensure_driver(conn: &mut PgConnection, driver_id: i64) -> Result<(), AppError> {
    users::fetch_active_driver(conn, driver_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found("Driver not found"))
}

pub async fn day_summary(
    pool: &PgPool,
    auth: &AuthContext,
    offset: FixedOffset,
    driver_id: Option<i64>,
    date: NaiveDate,
) -> Result<DaySummary, AppError> {
    let driver_id = driver_id.unwrap_or(auth.user_id);
    auth.require_self_or_admin(driver_id, "view day summaries")?;

    let mut conn = pool.acquire().await?;
    ensure_driver(&mut conn, driver_id).await?;
    compute_day_summary(&mut conn, driver_id, date, offset).await
}

/// Creates the (driver, date) handover or fully overwrites it while PENDING.
/// Returns the record and whether it was newly created.
#[instrument(skip(pool, auth, req), fields(user_id = auth.user_id, date = %req.date))]
pub async fn submit(
    pool: &PgPool,
    auth: &AuthContext,
    offset: FixedOffset,
    req: &SubmitHandoverRequest,
) -> Result<(CashHandover, bool), AppError> {
    req.validate()?;
    let driver_id = req.driver_id.unwrap_or(auth.user_id);
    auth.require_self_or_admin(driver_id, "submit handovers")?;

    let mut tx = pool.begin().await?;
    ensure_driver(&mut tx, driver_id).await?;

    let existing = handovers::lock_for_day(&mut tx, driver_id, req.date).await?;
    let action = decide_submit(existing.as_ref().map(|h| (h.id, h.status)))?;

    let summary = compute_day_summary(&mut tx, driver_id, req.date, offset).await?;
    let discrepancy = discrepancy(summary.expected_cash, req.actual_cash);
    validation::money("expected_cash", summary.expected_cash)?;
    validation::money("discrepancy", discrepancy)?;
    let submission = Submission {
        summary: &summary,
        actual_cash: req.actual_cash,
        discrepancy,
        driver_notes: req.driver_notes.as_deref(),
        shift_start: req.shift_start,
        shift_end: req.shift_end,
    };

    let (handover, created) = match action {
        SubmitAction::Create => {
            let handover = handovers::insert(&mut tx, &submission).await.map_err(|e| {
                AppError::from_unique_violation(
                    e,
                    "A handover for this driver and date was submitted concurrently; resubmit to update it",
                )
            })?;
            (handover, true)
        }
        SubmitAction::Resubmit(id) => {
            let handover = handovers::overwrite_pending(&mut tx, id, &submission)
                .await?
                .ok_or_else(|| AppError::invalid_transition("Handover already verified"))?;
            (handover, false)
        }
    };

    tx.commit().await?;

    info!(
        handover_id = handover.id,
        driver_id,
        expected = %handover.expected_cash,
        actual = %handover.actual_cash,
        discrepancy = %handover.discrepancy,
        created,
        "Cash handover submitted"
    );
    Ok((handover, created))
}

#[instrument(skip(pool, auth, req), fields(user_id = auth.user_id, target = ?req.status))]
pub async fn verify(
    pool: &PgPool,
    auth: &AuthContext,
    handover_id: i64,
    req: &VerifyHandoverRequest,
) -> Result<CashHandover, AppError> {
    auth.require_admin("verify handovers")?;
    req.validate()?;

    let mut tx = pool.begin().await?;

    let current = handovers::lock(&mut tx, handover_id)
        .await?
        .ok_or_else(|| AppError::not_found("Handover not found"))?;
    let verification = plan_verification(current.status, req.status, req.adjustment_amount)?;

    let handover = handovers::apply_verification(
        &mut tx,
        handover_id,
        &verification,
        auth.user_id,
        req.admin_notes.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::invalid_transition("Only pending handovers can be verified"))?;

    tx.commit().await?;

    info!(
        handover_id,
        status = handover.status.as_str(),
        verified_by = auth.user_id,
        "Cash handover verified"
    );
    Ok(handover)
}

pub async fn get(pool: &PgPool, auth: &AuthContext, handover_id: i64) -> Result<CashHandover, AppError> {
    let mut conn = pool.acquire().await?;
    let handover = handovers::fetch(&mut conn, handover_id)
        .await?
        .ok_or_else(|| AppError::not_found("Handover not found"))?;
    auth.require_self_or_admin(handover.driver_id, "view handovers")?;
    Ok(handover)
}

/// Drivers only ever see their own handovers.
pub async fn list(pool: &PgPool, auth: &AuthContext, query: HandoverListQuery) -> Result<Vec<CashHandover>, AppError> {
    let driver_id = if auth.is_admin() { query.driver_id } else { Some(auth.user_id) };
    let filter = HandoverFilter {
        status: query.status,
        driver_id,
        start_date: query.start_date,
        end_date: query.end_date,
    };

    let mut conn = pool.acquire().await?;
    Ok(handovers::list(&mut conn, &filter).await?)
}

pub async fn stats(
    pool: &PgPool,
    auth: &AuthContext,
    threshold: Decimal,
    query: HandoverStatsQuery,
) -> Result<HandoverStats, AppError> {
    auth.require_admin("view handover statistics")?;

    let filter = HandoverFilter {
        start_date: query.start_date,
        end_date: query.end_date,
        ..HandoverFilter::default()
    };
    let mut conn = pool.acquire().await?;
    let rows = handovers::list(&mut conn, &filter).await?;
    let stats = HandoverStats::compute(&rows, threshold);
    if !stats.large_discrepancies.is_empty() {
        warn!(count = stats.large_discrepancies.len(), %threshold, "Large handover discrepancies");
    }
    Ok(stats)
}
