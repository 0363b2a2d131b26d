use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use crate::dtos::expense::{CreateExpenseRequest, ExpenseListQuery, ReviewExpenseRequest};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::expense::Expense;
use crate::services::expense;
use crate::state::AppState;

pub async fn create_expense(
    State(AppState { db_pool, .. }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<Expense>), AppError> {
    let expense = expense::create(&db_pool, &auth, &req).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn review_expense(
    State(AppState { db_pool, .. }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<ReviewExpenseRequest>,
) -> Result<Json<Expense>, AppError> {
    Ok(Json(expense::review(&db_pool, &auth, id, &req).await?))
}

pub async fn list_expenses(
    State(AppState { db_pool, .. }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ExpenseListQuery>,
) -> Result<Json<Vec<Expense>>, AppError> {
    Ok(Json(expense::list(&db_pool, &auth, query).await?))
}
