//! Server startup and graceful shutdown

use crate::state::AppState;
use anyhow::Result;
use axum::Router;
use grabber_core::Config;
use std::net::SocketAddr;
use std::sync::Arc;

/// Start the server with graceful shutdown
pub async fn start_server(config: &Config, state: Arc<AppState>, app: Router) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server.port);
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        cache_backend = state.cache.backend_name(),
        link_lifetime_secs = config.download.link_lifetime.as_secs(),
        video_info_ttl_secs = config.cache.video_info_ttl.as_secs(),
        "Server ready and accepting connections"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    let pending = state.scheduler.pending();
    if pending > 0 {
        tracing::warn!(
            pending,
            "Shutting down with scheduled deletions outstanding; storage lifecycle rules must remove them"
        );
    }

    Ok(())
}

/// Signal handler for graceful shutdown
///
/// Listens for Ctrl+C (SIGINT) and SIGTERM signals to initiate graceful shutdown.
///
/// # Panics
/// - Panics if Ctrl+C signal handler cannot be installed (unrecoverable system error)
/// - On Unix systems, panics if SIGTERM signal handler cannot be installed (unrecoverable system error)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
