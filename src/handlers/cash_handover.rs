use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::FixedOffset;

use crate::config::AppConfig;
use crate::domain::handover::HandoverStats;
use crate::domain::summary::DaySummary;
use crate::dtos::cash_handover::{
    DaySummaryQuery, HandoverListQuery, HandoverStatsQuery, SubmitHandoverRequest, VerifyHandoverRequest,
};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::cash_handover::CashHandover;
use crate::services::cash_handover;
use crate::state::AppState;

fn business_offset(config: &AppConfig) -> Result<FixedOffset, AppError> {
    config
        .business_offset()
        .ok_or_else(|| AppError::internal("Business UTC offset is out of range"))
}

pub async fn get_day_summary(
    State(AppState { db_pool, config }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<DaySummaryQuery>,
) -> Result<Json<DaySummary>, AppError> {
    let offset = business_offset(&config)?;
    let summary = cash_handover::day_summary(&db_pool, &auth, offset, query.driver_id, query.date).await?;
    Ok(Json(summary))
}

/// 201 when the day's handover is created, 200 when a pending one is overwritten.
pub async fn submit_handover(
    State(AppState { db_pool, config }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<SubmitHandoverRequest>,
) -> Result<(StatusCode, Json<CashHandover>), AppError> {
    let offset = business_offset(&config)?;
    let (handover, created) = cash_handover::submit(&db_pool, &auth, offset, &req).await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(handover)))
}

pub async fn verify_handover(
    State(AppState { db_pool, .. }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<VerifyHandoverRequest>,
) -> Result<Json<CashHandover>, AppError> {
    Ok(Json(cash_handover::verify(&db_pool, &auth, id, &req).await?))
}

pub async fn get_handover(
    State(AppState { db_pool, .. }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<CashHandover>, AppError> {
    Ok(Json(cash_handover::get(&db_pool, &auth, id).await?))
}

pub async fn list_handovers(
    State(AppState { db_pool, .. }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<HandoverListQuery>,
) -> Result<Json<Vec<CashHandover>>, AppError> {
    Ok(Json(cash_handover::list(&db_pool, &auth, query).await?))
}

pub async fn get_handover_stats(
    State(AppState { db_pool, config }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<HandoverStatsQuery>,
) -> Result<Json<HandoverStats>, AppError> {
    let stats = cash_handover::stats(&db_pool, &auth, config.large_discrepancy_threshold, query).await?;
    Ok(Json(stats))
}
