// Module: http
// HTTP/JSON API over the reservation core

pub mod check;
pub mod error;
pub mod ping;
pub mod reserve;
pub mod sse;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use airlock_core::{EventBus, StreamingService};

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub streaming: Arc<StreamingService>,
    pub events: EventBus,
}

/// Create the HTTP router with all routes
pub fn create_router(streaming: Arc<StreamingService>, events: EventBus) -> Router {
    let state = AppState { streaming, events };

    let router = Router::new()
        // Liveness probe
        .merge(ping::create_ping_router())
        // Slot availability
        .route("/check", get(check::check))
        // Slot reservation
        .route("/reserve", post(reserve::reserve))
        // Availability event stream
        .route("/sse", get(sse::sse));

    // Apply layers before state
    let router = router
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Apply state to all routes (must be last)
    router.with_state(state)
}
