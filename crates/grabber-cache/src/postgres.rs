use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use grabber_core::Clock;
use sqlx::{PgPool, Row};

use crate::traits::{CacheResult, CacheStore, WindowHit};

/// PostgreSQL-backed cache shared by every replica.
///
/// The fixed-window primitive is one `INSERT .. ON CONFLICT DO UPDATE .. RETURNING`
/// statement, so concurrent hits on the same key serialize on the row lock.
#[derive(Clone)]
pub struct PgCache {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PgCache {
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn duration_ms(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

#[async_trait]
impl CacheStore for PgCache {
    #[tracing::instrument(skip(self), fields(db.table = "cache_entries", db.operation = "select"))]
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now_ms = self.clock.now_ms();
        let row = sqlx::query("SELECT value, expires_at_ms FROM cache_entries WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let expires_at_ms: i64 = row.try_get("expires_at_ms")?;
        if expires_at_ms <= now_ms {
            sqlx::query("DELETE FROM cache_entries WHERE key = $1 AND expires_at_ms <= $2")
                .bind(key)
                .bind(now_ms)
                .execute(&self.pool)
                .await?;
            return Ok(None);
        }

        Ok(Some(row.try_get("value")?))
    }

    #[tracing::instrument(skip(self, value), fields(db.table = "cache_entries", db.operation = "upsert"))]
    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        let expires_at_ms = self.clock.now_ms().saturating_add(duration_ms(ttl));
        sqlx::query(
            r#"
            INSERT INTO cache_entries (key, value, expires_at_ms)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, expires_at_ms = EXCLUDED.expires_at_ms
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(expires_at_ms)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "cache_entries", db.operation = "delete"))]
    async fn delete(&self, key: &str) -> CacheResult<()> {
        sqlx::query("DELETE FROM cache_entries WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "cache_windows", db.operation = "upsert"))]
    async fn hit_fixed_window(
        &self,
        key: &str,
        now_ms: i64,
        window: Duration,
        limit: u32,
    ) -> CacheResult<WindowHit> {
        let limit = i32::try_from(limit).unwrap_or(i32::MAX);
        let row = sqlx::query(
            r#"
            INSERT INTO cache_windows (key, count, window_start_ms, last_rejected)
            VALUES ($1, 1, $2, FALSE)
            ON CONFLICT (key) DO UPDATE SET
                count = CASE
                    WHEN $2 - cache_windows.window_start_ms > $3 THEN 1
                    WHEN cache_windows.count >= $4 THEN cache_windows.count
                    ELSE cache_windows.count + 1
                END,
                window_start_ms = CASE
                    WHEN $2 - cache_windows.window_start_ms > $3 THEN $2
                    ELSE cache_windows.window_start_ms
                END,
                last_rejected = (
                    $2 - cache_windows.window_start_ms <= $3
                    AND cache_windows.count >= $4
                )
            RETURNING count, window_start_ms, last_rejected
            "#,
        )
        .bind(key)
        .bind(now_ms)
        .bind(duration_ms(window))
        .bind(limit)
        .fetch_one(&self.pool)
        .await?;

        let count: i32 = row.try_get("count")?;
        let rejected: bool = row.try_get("last_rejected")?;

        Ok(WindowHit {
            admitted: !rejected,
            count: u32::try_from(count).unwrap_or(0),
            window_start_ms: row.try_get("window_start_ms")?,
        })
    }

    #[tracing::instrument(skip(self), fields(db.operation = "purge"))]
    async fn purge_expired(&self, idle: Duration) -> CacheResult<u64> {
        let now_ms = self.clock.now_ms();

        let entries = sqlx::query("DELETE FROM cache_entries WHERE expires_at_ms <= $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        let windows = sqlx::query("DELETE FROM cache_windows WHERE $1 - window_start_ms > $2")
            .bind(now_ms)
            .bind(duration_ms(idle))
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(entries + windows)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
