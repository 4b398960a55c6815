//! Liveness endpoint
//!
//! Answers as soon as the server is up, for monitoring probes.

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};

use crate::http::AppState;

/// Ping router
pub fn create_ping_router() -> Router<AppState> {
    Router::new().route("/ping", get(ping))
}

/// Liveness check (always succeeds if the server is running)
pub async fn ping() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
