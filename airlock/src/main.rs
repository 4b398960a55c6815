mod server;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use airlock_core::{
    bootstrap::{init_services, load_config},
    logging,
};

use server::AirlockServer;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load and validate configuration (fails fast on misconfigurations)
    let config = load_config()?;

    // 2. Initialize logging
    logging::init_logging(&config.logging)?;
    info!("Airlock server starting...");
    info!("HTTP address: {}", config.http_address());
    info!("SRT ingest address: {}", config.srt_address());
    info!("Broadcast sink: {}", config.broadcast_address());

    // 3. Initialize services
    let config = Arc::new(config);
    let services = init_services(Arc::clone(&config))?;

    // 4. Start the server and wait for shutdown signal
    let server = AirlockServer::new(config, services);
    server.start().await
}
