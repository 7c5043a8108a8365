//! Application setup and initialization
//!
//! Builds the collaborators from configuration, wires the pipelines into
//! [`AppState`] and assembles the router.

pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::Result;
use grabber_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    grabber_infra::init_telemetry(config.json_logs())?;

    tracing::info!(
        environment = %config.server.environment,
        cache_backend = %config.cache.backend,
        storage_backend = %config.storage.backend,
        "Configuration loaded and validated successfully"
    );

    let state = services::initialize_services(&config).await?;
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
