pub mod bootstrap;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod service;
pub mod time;

pub use config::Config;
pub use error::{Error, Result};
pub use events::EventBus;
pub use service::StreamingService;
