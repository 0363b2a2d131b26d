pub mod cash_handovers;
pub mod customers;
pub mod expenses;
pub mod orders;

use axum::Router;
use crate::state::AppState;

/// Every route here sits behind `require_auth`.
pub fn create_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(orders::routes(state))
        .merge(cash_handovers::routes(state))
        .merge(expenses::routes(state))
        .merge(customers::routes(state))
}
