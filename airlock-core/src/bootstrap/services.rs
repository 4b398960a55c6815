//! Service initialization and dependency injection

use std::sync::Arc;

use tracing::info;

use crate::client::{RecorderClient, ScheduleClient};
use crate::events::EventBus;
use crate::pipeline::{PipelineRunner, ProcessStreamFactory, StreamFactory};
use crate::service::StreamingService;
use crate::Config;

/// Container for all initialized services
#[derive(Clone)]
pub struct Services {
    /// Reservation orchestrator for the shared uplink slot
    pub streaming: Arc<StreamingService>,
    /// Event bus the SSE endpoint subscribes to
    pub events: EventBus,
}

/// Initialize all core services
pub fn init_services(config: Arc<Config>) -> Result<Services, anyhow::Error> {
    info!("Initializing services...");

    let events = EventBus::new();

    let schedule = ScheduleClient::new(&config.schedule)?;
    let recorder = RecorderClient::new(&config.recorder)?;
    info!("Upstream clients initialized");

    let factory: Arc<dyn StreamFactory> = Arc::new(ProcessStreamFactory::new());
    let runner = PipelineRunner::new(Arc::clone(&config), factory);

    let streaming = Arc::new(StreamingService::new(
        config,
        events.clone(),
        schedule,
        recorder,
        runner,
    ));
    info!("Streaming service initialized");

    Ok(Services { streaming, events })
}
