//! Tracing initialization

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "grabber=debug,grabber_api=debug,tower_http=debug";

/// Initialize tracing with an `EnvFilter` from `RUST_LOG` and either a
/// human-readable or a JSON formatter.
pub fn init_telemetry(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let result = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!(json, "Tracing initialized");
    Ok(())
}
