//! Axum application builder
//!
//! - `POST /seller` - register or re-register a seller
//! - `GET /sellers` - sellers, richest first
//! - `GET /history?chunk=N` - sampled cash balances per seller

use axum::routing::{get, post};
use axum::Router;

use super::routes;
use super::state::ServerState;

/// Create the Axum application with all routes
pub fn create_app(state: ServerState) -> Router {
    Router::new()
        .route("/seller", post(routes::register_seller))
        .route("/sellers", get(routes::list_sellers))
        .route("/history", get(routes::history))
        .with_state(state)
}
