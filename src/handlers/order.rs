use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::dtos::order::{OrderResponse, ReplaceOrderItemsRequest, UpdateOrderStatusRequest};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::services::fulfillment;
use crate::state::AppState;

pub async fn get_order(
    State(AppState { db_pool, .. }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<OrderResponse>, AppError> {
    Ok(Json(fulfillment::get_order(&db_pool, &auth, id).await?))
}

pub async fn update_order_status(
    State(AppState { db_pool, .. }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    Ok(Json(fulfillment::update_status(&db_pool, &auth, id, &req).await?))
}

pub async fn replace_order_items(
    State(AppState { db_pool, .. }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<ReplaceOrderItemsRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    Ok(Json(fulfillment::replace_items(&db_pool, &auth, id, &req).await?))
}
