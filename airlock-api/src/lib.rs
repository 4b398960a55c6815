// Airlock API Library
//
// HTTP/JSON surface over the reservation core.

pub mod http;

// Re-export commonly used types
pub use http::{create_router, AppState};
