use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, put},
    Router,
};
use crate::state::AppState;
use crate::handlers::order;
use crate::middleware::auth::require_auth;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/orders/{id}", get(order::get_order))
        .route("/orders/{id}/status", patch(order::update_order_status))
        .route("/orders/{id}/items", put(order::replace_order_items))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}
