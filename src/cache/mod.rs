//! Read-through cache over the relational store.
//!
//! Collections and items of each resource, plus the donor leaderboard, are
//! served from a volatile key-value store when present and fetched from
//! Postgres otherwise. Key strings and TTLs are fixed by [`keys`].
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! backend = "redis"            # or "memory"
//! redis_url = "redis://127.0.0.1:6379"
//! resource_ttl_seconds = 300
//! leaderboard_ttl_seconds = 3600
//! ```

mod config;
mod connection;
pub mod keys;
mod leaderboard;
mod redis_store;
mod resolver;
mod services;
mod store;

pub use config::{CacheBackend, CacheConfig};
pub use connection::{Backoff, ConnectionMonitor, ConnectionState, connect_with_backoff};
pub use keys::{CacheKey, LEADERBOARD_KEY, TtlPolicy};
pub use leaderboard::{Leaderboard, LeaderboardAggregator};
pub use redis_store::RedisStore;
pub use resolver::{CacheResolver, ResolveError, Resolved, Source};
pub use services::{CacheServices, open_store, open_store_within};
pub use store::{CacheError, CacheStore, MemoryStore};

pub const METRIC_CACHE_HIT: &str = "cerahati_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "cerahati_cache_miss_total";
pub const METRIC_CACHE_FAIL_OPEN: &str = "cerahati_cache_fail_open_total";
pub const METRIC_CACHE_WRITE_ERROR: &str = "cerahati_cache_write_error_total";
pub const METRIC_LEADERBOARD_REFRESH: &str = "cerahati_leaderboard_refresh_total";
