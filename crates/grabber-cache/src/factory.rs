//! Cache factory for creating cache instances based on configuration

use std::sync::Arc;

use grabber_core::{CacheBackend, CacheConfig, Clock};

use crate::memory::MemoryCache;
use crate::traits::{CacheError, CacheResult, CacheStore};

/// Create a cache instance based on configuration.
///
/// The PostgreSQL backend connects, applies the workspace migrations and
/// returns a store backed by the pool.
pub async fn create_cache(
    config: &CacheConfig,
    clock: Arc<dyn Clock>,
) -> CacheResult<Arc<dyn CacheStore>> {
    match config.backend {
        CacheBackend::Memory => {
            tracing::info!("Using in-memory cache backend");
            Ok(Arc::new(MemoryCache::new(clock)))
        }
        #[cfg(feature = "cache-postgres")]
        CacheBackend::Postgres => {
            let database_url = config.database_url.as_deref().ok_or_else(|| {
                CacheError::ConfigError("DATABASE_URL is required for postgres cache".to_string())
            })?;
            let pool = connect_postgres(database_url).await?;
            tracing::info!("Using PostgreSQL cache backend");
            Ok(Arc::new(crate::postgres::PgCache::new(pool, clock)))
        }
        #[cfg(not(feature = "cache-postgres"))]
        CacheBackend::Postgres => Err(CacheError::ConfigError(
            "PostgreSQL cache support not enabled. Enable 'cache-postgres' feature.".to_string(),
        )),
    }
}

#[cfg(feature = "cache-postgres")]
async fn connect_postgres(database_url: &str) -> CacheResult<sqlx::PgPool> {
    use sqlx::postgres::PgPoolOptions;
    use std::path::Path;
    use std::time::Duration;

    tracing::info!("Connecting to cache database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .connect(database_url)
        .await?;

    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .map_err(|e| CacheError::ConfigError(format!("Failed to load migrations: {}", e)))?;
    migrator
        .run(&pool)
        .await
        .map_err(|e| CacheError::ConfigError(format!("Failed to run migrations: {}", e)))?;
    tracing::info!("Cache database migrations applied");

    Ok(pool)
}
