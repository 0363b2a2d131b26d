use axum::{middleware::from_fn_with_state, routing::get, Router};
use crate::state::AppState;
use crate::handlers::customer;
use crate::middleware::auth::require_auth;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/customers/{id}/ledger", get(customer::get_ledger))
        .route("/customers/{id}/bottle-wallets", get(customer::get_bottle_wallets))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}
