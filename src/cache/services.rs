use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::application::repos::{DonorStatsRepo, ResourceRepo};

use super::config::{CacheBackend, CacheConfig};
use super::connection::{ConnectionMonitor, ConnectionState};
use super::keys::TtlPolicy;
use super::leaderboard::LeaderboardAggregator;
use super::redis_store;
use super::resolver::CacheResolver;
use super::store::{CacheError, CacheStore, MemoryStore};

const MEMORY_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Resolvers sharing one volatile store connection.
#[derive(Clone)]
pub struct CacheServices {
    pub resolver: CacheResolver,
    pub leaderboard: LeaderboardAggregator,
}

impl CacheServices {
    pub fn new<R>(store: Arc<dyn CacheStore>, repo: Arc<R>, ttl: TtlPolicy) -> Self
    where
        R: ResourceRepo + DonorStatsRepo + 'static,
    {
        let resources: Arc<dyn ResourceRepo> = repo.clone();
        let donors: Arc<dyn DonorStatsRepo> = repo;
        Self {
            resolver: CacheResolver::new(store.clone(), resources, ttl),
            leaderboard: LeaderboardAggregator::new(store, donors, ttl.leaderboard),
        }
    }
}

/// Open the configured backend. For Redis this waits until the first
/// connection succeeds.
pub async fn open_store(
    config: &CacheConfig,
    monitor: ConnectionMonitor,
) -> Result<Arc<dyn CacheStore>, CacheError> {
    info!(
        target = "cerahati::cache",
        backend = config.backend.as_str(),
        "opening cache store"
    );
    match config.backend {
        CacheBackend::Memory => {
            let store = Arc::new(MemoryStore::new());
            store.spawn_purger(MEMORY_PURGE_INTERVAL);
            monitor.set(ConnectionState::Connected);
            Ok(store)
        }
        CacheBackend::Redis => {
            let store = redis_store::connect(config, monitor).await?;
            Ok(Arc::new(store))
        }
    }
}

/// [`open_store`] for one-shot commands: gives up once `limit` elapses.
pub async fn open_store_within(
    config: &CacheConfig,
    monitor: ConnectionMonitor,
    limit: Duration,
) -> Result<Arc<dyn CacheStore>, CacheError> {
    match tokio::time::timeout(limit, open_store(config, monitor)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                target = "cerahati::cache",
                backend = config.backend.as_str(),
                limit_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                "cache store not reachable in time"
            );
            Err(CacheError::Unavailable(format!(
                "no connection to {} within {}s",
                config.redis_url,
                limit.as_secs()
            )))
        }
    }
}
