//! HTTP gateway between README clients and the generation backend
//!
//! Exposes `GET /health` and `POST /api/generate`, applies per-client rate
//! limiting and hides the backend credential from callers.

pub mod client;
pub mod models;
pub mod rate_limiter;
pub mod routes;

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use crate::config::Config;
use crate::core::llm::TextGenerator;
use crate::error::{ReadmeAiError, Result};

pub use client::GatewayClient;
pub use routes::{create_router, GatewayState};

/// Bind and serve until Ctrl+C or SIGTERM
pub async fn serve(config: &Config, generator: Box<dyn TextGenerator>) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| ReadmeAiError::Config(format!("Failed to bind {}: {}", addr, e)))?;

    info!(
        address = %addr,
        provider = generator.provider_name(),
        model = generator.model_name(),
        window_secs = config.rate_limit.window_secs,
        max_requests = config.rate_limit.max_requests,
        "README gateway listening"
    );

    let router = create_router(GatewayState::new(config, generator));

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("README gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
