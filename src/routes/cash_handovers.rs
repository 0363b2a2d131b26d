use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use crate::state::AppState;
use crate::handlers::cash_handover;
use crate::middleware::auth::require_auth;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Drivers preview, submit and read their own; verification and stats are admin only
        .route("/cash-handovers", get(cash_handover::list_handovers).post(cash_handover::submit_handover))
        .route("/cash-handovers/summary", get(cash_handover::get_day_summary))
        .route("/cash-handovers/stats", get(cash_handover::get_handover_stats))
        .route("/cash-handovers/{id}", get(cash_handover::get_handover))
        .route("/cash-handovers/{id}/verify", post(cash_handover::verify_handover))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}
