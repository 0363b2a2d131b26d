use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use crate::state::AppState;
use crate::handlers::expense;
use crate::middleware::auth::require_auth;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/expenses", get(expense::list_expenses).post(expense::create_expense))
        .route("/expenses/{id}/review", post(expense::review_expense))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}
