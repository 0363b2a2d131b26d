pub mod auth;
pub mod config;
pub mod database;
pub mod domain;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Full application router under the `/AquaFlow` base path.
pub fn app(state: AppState) -> Router {
    let api = routes::create_router(&state)
        .route("/", get(|| async { "AquaFlow API" }))
        .route("/health", get(health_check));

    Router::new()
        .nest("/AquaFlow", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
