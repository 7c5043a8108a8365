//! Fixed-window counter against a real PostgreSQL database.
//!
//! Run with: `DATABASE_URL=postgres://... cargo test -p grabber-cache --test postgres_window_test -- --ignored`
//!
//! Each test gets a fresh database with the workspace migrations applied.

#![cfg(feature = "cache-postgres")]

use std::sync::Arc;
use std::time::Duration;

use grabber_cache::{CacheStore, PgCache};
use grabber_core::ManualClock;
use sqlx::PgPool;

const WINDOW: Duration = Duration::from_secs(60);
const START_MS: i64 = 1_700_000_000_000;

fn cache(pool: PgPool) -> PgCache {
    PgCache::new(pool, Arc::new(ManualClock::from_millis(START_MS)))
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires PostgreSQL via DATABASE_URL
async fn test_limit_reached_rejects_without_counting(pool: PgPool) {
    let cache = cache(pool);

    for expected in 1..=3 {
        let hit = cache
            .hit_fixed_window("rate-limit:1.2.3.4", START_MS + 1_000, WINDOW, 3)
            .await
            .unwrap();
        assert!(hit.admitted);
        assert_eq!(hit.count, expected);
        assert_eq!(hit.window_start_ms, START_MS + 1_000);
    }

    for _ in 0..2 {
        let hit = cache
            .hit_fixed_window("rate-limit:1.2.3.4", START_MS + 30_000, WINDOW, 3)
            .await
            .unwrap();
        assert!(!hit.admitted);
        assert_eq!(hit.count, 3);
        assert_eq!(hit.window_start_ms, START_MS + 1_000);
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires PostgreSQL via DATABASE_URL
async fn test_window_resets_only_after_it_elapses(pool: PgPool) {
    let cache = cache(pool);
    let key = "rate-limit:10.0.0.1";

    cache.hit_fixed_window(key, START_MS, WINDOW, 1).await.unwrap();

    // Age equal to the window is still inside it.
    let edge = cache
        .hit_fixed_window(key, START_MS + 60_000, WINDOW, 1)
        .await
        .unwrap();
    assert!(!edge.admitted);

    let fresh = cache
        .hit_fixed_window(key, START_MS + 60_001, WINDOW, 1)
        .await
        .unwrap();
    assert!(fresh.admitted);
    assert_eq!(fresh.count, 1);
    assert_eq!(fresh.window_start_ms, START_MS + 60_001);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires PostgreSQL via DATABASE_URL
async fn test_concurrent_hits_admit_exactly_limit(pool: PgPool) {
    let cache = Arc::new(cache(pool));
    let limit = 5;

    let handles: Vec<_> = (0..25)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .hit_fixed_window("rate-limit:203.0.113.7", START_MS, WINDOW, limit)
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap().admitted {
            admitted += 1;
        }
    }
    assert_eq!(admitted, limit);

    let after = cache
        .hit_fixed_window("rate-limit:203.0.113.7", START_MS + 1, WINDOW, limit)
        .await
        .unwrap();
    assert!(!after.admitted);
    assert_eq!(after.count, limit);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires PostgreSQL via DATABASE_URL
async fn test_keys_are_counted_independently(pool: PgPool) {
    let cache = cache(pool);

    let a = cache
        .hit_fixed_window("rate-limit:a", START_MS, WINDOW, 1)
        .await
        .unwrap();
    let b = cache
        .hit_fixed_window("rate-limit:b", START_MS, WINDOW, 1)
        .await
        .unwrap();

    assert!(a.admitted);
    assert!(b.admitted);
}
