//! Slot state and the reservation orchestrator.

pub mod slot;
pub mod streaming;

pub use slot::StreamSlot;
pub use streaming::StreamingService;
