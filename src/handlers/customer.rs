use axum::{
    extract::{Path, State},
    Json,
};

use crate::dtos::customer::CustomerStatement;
use crate::error::AppError;
use crate::models::bottle_wallet::BottleWallet;
use crate::services::customer;
use crate::state::AppState;

pub async fn get_ledger(
    State(AppState { db_pool, .. }): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CustomerStatement>, AppError> {
    Ok(Json(customer::statement(&db_pool, id).await?))
}

pub async fn get_bottle_wallets(
    State(AppState { db_pool, .. }): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<BottleWallet>>, AppError> {
    Ok(Json(customer::bottle_wallets(&db_pool, id).await?))
}
