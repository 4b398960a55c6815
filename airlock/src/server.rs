//! Server lifecycle management
//!
//! Manages the startup and shutdown of the HTTP server and the pipeline
//! watchers behind the streaming service.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use airlock_core::{bootstrap::Services, Config};

/// Airlock server - manages the HTTP listener and graceful shutdown
pub struct AirlockServer {
    config: Arc<Config>,
    services: Services,
}

impl AirlockServer {
    /// Create a new server instance
    pub const fn new(config: Arc<Config>, services: Services) -> Self {
        Self { config, services }
    }

    /// Start the HTTP server and wait for a shutdown signal
    pub async fn start(self) -> anyhow::Result<()> {
        info!("Starting airlock server...");

        // Create shutdown signal channel
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // Start HTTP server with graceful shutdown
        let http_handle = self.start_http_server(shutdown_rx);

        info!("Server started successfully");

        // Wait for either the server to stop or a shutdown signal
        tokio::select! {
            _ = http_handle => {
                error!("HTTP server stopped unexpectedly");
            }
            () = shutdown_signal() => {
                info!("Shutdown signal received, starting graceful shutdown...");
            }
        }

        // Signal the HTTP server to shut down
        let _ = shutdown_tx.send(true);

        // Run graceful shutdown
        self.shutdown().await;

        Ok(())
    }

    /// Gracefully shut down: let running pipeline watchers finish
    async fn shutdown(&self) {
        info!("Shutting down airlock server...");

        self.services.streaming.shutdown().await;

        info!("Airlock server shut down complete");
    }

    /// Start HTTP server with graceful shutdown support
    fn start_http_server(&self, shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        let http_address = self.config.http_address();
        let router = airlock_api::create_router(
            self.services.streaming.clone(),
            self.services.events.clone(),
        );

        tokio::spawn(async move {
            let listener = match tokio::net::TcpListener::bind(&http_address).await {
                Ok(listener) => listener,
                Err(e) => {
                    error!("Failed to bind HTTP address {}: {}", http_address, e);
                    return;
                }
            };

            info!("HTTP server listening on {}", http_address);

            let mut rx = shutdown_rx;
            let graceful = async move {
                let _ = rx.changed().await;
            };

            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(graceful)
                .await
            {
                error!("HTTP server error: {}", e);
            }

            info!("HTTP server shut down gracefully");
        })
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT/Ctrl+C)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("Received Ctrl+C"); }
        () = terminate => { info!("Received SIGTERM"); }
    }
}
