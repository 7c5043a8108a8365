//! Media Grabber Cache
//!
//! Key-value cache with per-entry TTL plus an atomic fixed-window counter.
//! Pipelines talk to it through [`CacheClient`], which treats every backend
//! failure as a miss; the admission gate calls [`CacheStore::hit_fixed_window`]
//! directly.
//!
//! Backends:
//! - [`MemoryCache`]: sharded in-process maps, swept periodically
//! - `PgCache` (feature `cache-postgres`): PostgreSQL tables shared by every replica

pub mod client;
pub mod factory;
pub mod memory;
#[cfg(feature = "cache-postgres")]
pub mod postgres;
pub mod sweeper;
pub mod traits;

pub use client::CacheClient;
pub use factory::create_cache;
pub use memory::MemoryCache;
#[cfg(feature = "cache-postgres")]
pub use postgres::PgCache;
pub use sweeper::start_sweeper;
pub use traits::{CacheError, CacheResult, CacheStore, WindowHit};
