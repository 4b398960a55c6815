// Slot availability HTTP handler

use axum::{extract::State, Json};

use airlock_core::models::Availability;

use super::AppState;

/// Report current slot availability
pub async fn check(State(state): State<AppState>) -> Json<Availability> {
    Json(state.streaming.check().await)
}
