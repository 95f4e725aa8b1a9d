//! Cache-aside resolution of resource collections and items.
//!
//! Every read checks the volatile store first. On a miss the durable store is
//! queried and the result written back with the resource TTL. Any failure of
//! the volatile store, including an undecodable payload, is treated as a miss.
//! Nothing is cached for lookups that find no row.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::repos::{RepoError, ResourceRepo};
use crate::domain::resources::Resource;

use super::keys::{CacheKey, TtlPolicy};
use super::store::CacheStore;
use super::{
    METRIC_CACHE_FAIL_OPEN, METRIC_CACHE_HIT, METRIC_CACHE_MISS, METRIC_CACHE_WRITE_ERROR,
};

/// Where a payload was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Database,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Cache => "cache",
            Source::Database => "database",
        }
    }
}

/// A payload tagged with its origin; serializes as `{"source": .., "data": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved {
    pub source: Source,
    pub data: Value,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{resource} {id} not found")]
    NotFound { resource: Resource, id: i64 },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct CacheResolver {
    store: Arc<dyn CacheStore>,
    repo: Arc<dyn ResourceRepo>,
    ttl: TtlPolicy,
}

impl CacheResolver {
    pub fn new(store: Arc<dyn CacheStore>, repo: Arc<dyn ResourceRepo>, ttl: TtlPolicy) -> Self {
        Self { store, repo, ttl }
    }

    pub async fn resolve_collection(&self, resource: Resource) -> Result<Resolved, ResolveError> {
        let key = CacheKey::Collection(resource);
        if let Some(data) = read_cached::<Value>(self.store.as_ref(), &key).await {
            return Ok(Resolved {
                source: Source::Cache,
                data,
            });
        }

        let data = self.repo.list(resource).await?;
        write_cached(self.store.as_ref(), &key, &data, self.ttl.ttl_for(&key)).await;
        Ok(Resolved {
            source: Source::Database,
            data,
        })
    }

    pub async fn resolve_item(&self, resource: Resource, id: i64) -> Result<Resolved, ResolveError> {
        let key = CacheKey::Item(resource, id);
        if let Some(data) = read_cached::<Value>(self.store.as_ref(), &key).await {
            return Ok(Resolved {
                source: Source::Cache,
                data,
            });
        }

        let data = self
            .repo
            .find(resource, id)
            .await?
            .ok_or(ResolveError::NotFound { resource, id })?;
        write_cached(self.store.as_ref(), &key, &data, self.ttl.ttl_for(&key)).await;
        Ok(Resolved {
            source: Source::Database,
            data,
        })
    }

    /// The first donation recorded for `user_id`.
    pub async fn resolve_donation_by_user(&self, user_id: i64) -> Result<Resolved, ResolveError> {
        let key = CacheKey::DonationsByUser(user_id);
        if let Some(data) = read_cached::<Value>(self.store.as_ref(), &key).await {
            return Ok(Resolved {
                source: Source::Cache,
                data,
            });
        }

        let data = self
            .repo
            .find_donation_by_user(user_id)
            .await?
            .ok_or(ResolveError::NotFound {
                resource: Resource::Donations,
                id: user_id,
            })?;
        write_cached(self.store.as_ref(), &key, &data, self.ttl.ttl_for(&key)).await;
        Ok(Resolved {
            source: Source::Database,
            data,
        })
    }
}

/// Look up and decode `key`; `None` sends the caller to the durable store.
pub(super) async fn read_cached<T: DeserializeOwned>(
    store: &dyn CacheStore,
    key: &CacheKey,
) -> Option<T> {
    let kind = key.kind();
    let resource = key.resource().map_or("leaderboard", Resource::as_str);
    let rendered = key.to_string();

    let raw = match store.get(&rendered).await {
        Ok(Some(raw)) if !raw.is_empty() => raw,
        Ok(_) => {
            counter!(METRIC_CACHE_MISS, "kind" => kind).increment(1);
            debug!(target = "cerahati::cache", key = %rendered, kind, resource, "cache miss");
            return None;
        }
        Err(err) => {
            counter!(METRIC_CACHE_MISS, "kind" => kind).increment(1);
            counter!(METRIC_CACHE_FAIL_OPEN, "kind" => kind, "reason" => "store").increment(1);
            warn!(
                target = "cerahati::cache",
                key = %rendered,
                kind,
                resource,
                error = %err,
                "cache read failed; falling back to database"
            );
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => {
            counter!(METRIC_CACHE_HIT, "kind" => kind).increment(1);
            debug!(target = "cerahati::cache", key = %rendered, kind, resource, "cache hit");
            Some(value)
        }
        Err(err) => {
            counter!(METRIC_CACHE_MISS, "kind" => kind).increment(1);
            counter!(METRIC_CACHE_FAIL_OPEN, "kind" => kind, "reason" => "decode").increment(1);
            warn!(
                target = "cerahati::cache",
                key = %rendered,
                kind,
                resource,
                error = %err,
                "cached payload is not valid JSON; falling back to database"
            );
            None
        }
    }
}

/// Encode and store `value`, logging rather than propagating failures.
pub(super) async fn write_cached<T: Serialize + ?Sized>(
    store: &dyn CacheStore,
    key: &CacheKey,
    value: &T,
    ttl: Duration,
) {
    let kind = key.kind();
    let resource = key.resource().map_or("leaderboard", Resource::as_str);
    let rendered = key.to_string();

    let payload = match serde_json::to_string(value) {
        Ok(payload) => payload,
        Err(err) => {
            counter!(METRIC_CACHE_WRITE_ERROR, "kind" => kind).increment(1);
            warn!(
                target = "cerahati::cache",
                key = %rendered,
                kind,
                resource,
                error = %err,
                "failed to encode cache payload"
            );
            return;
        }
    };

    if let Err(err) = store.set_ex(&rendered, payload, ttl).await {
        counter!(METRIC_CACHE_WRITE_ERROR, "kind" => kind).increment(1);
        warn!(
            target = "cerahati::cache",
            key = %rendered,
            kind,
            resource,
            error = %err,
            "failed to write cache entry"
        );
    }
}
