// Slot reservation HTTP handler

use axum::{extract::State, http::StatusCode, Json};

use airlock_core::models::{Reservation, ReserveRequest};

use super::{AppResult, AppState};

/// Reserve the slot for an event
pub async fn reserve(
    State(state): State<AppState>,
    Json(request): Json<ReserveRequest>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    let reservation = state.streaming.reserve(request).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}
