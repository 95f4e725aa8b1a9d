//! Volatile key-value store abstraction.
//!
//! The resolvers only need `GET` and `SETEX`; Redis serves production traffic
//! and [`MemoryStore`] backs single-process deployments and tests.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
    #[error("cache command failed: {0}")]
    Command(String),
    #[error("invalid cache configuration: {0}")]
    Configuration(String),
}

/// A key-value store with per-key expiration.
///
/// Implementations must be safe to share across concurrent requests; single-key
/// `get`/`set_ex` atomicity is all the resolvers rely on.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Write `value` under `key`, replacing any previous entry and its expiry.
    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
}

struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

/// In-process store with absolute expiry on the tokio clock.
///
/// Expired entries are never returned. They are dropped on the next access
/// to the same key or by [`MemoryStore::spawn_purger`].
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Entries are whole values, so a poisoned map is still consistent.
    fn read(&self, op: &'static str) -> RwLockReadGuard<'_, HashMap<String, MemoryEntry>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            warn!(target = "cerahati::cache::store", op, "memory store lock poisoned");
            PoisonError::into_inner(poisoned)
        })
    }

    fn write(&self, op: &'static str) -> RwLockWriteGuard<'_, HashMap<String, MemoryEntry>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            warn!(target = "cerahati::cache::store", op, "memory store lock poisoned");
            PoisonError::into_inner(poisoned)
        })
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.read("len")
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.write("purge_expired");
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Purge expired entries every `every` until the store is dropped.
    pub fn spawn_purger(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let store: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                let purged = store.purge_expired();
                if purged > 0 {
                    debug!(target = "cerahati::cache::store", purged, "expired entries purged");
                }
            }
        })
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        {
            let entries = self.read("get");
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        let mut entries = self.write("get.evict");
        if entries.get(key).is_some_and(|entry| entry.expires_at <= now) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = Instant::now() + ttl;
        self.write("set_ex")
            .insert(key.to_string(), MemoryEntry { value, expires_at });
        Ok(())
    }
}
