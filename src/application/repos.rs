//! Repository traits describing the durable store.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::leaderboard::DonorTotals;
use crate::domain::records::RecordFields;
use crate::domain::resources::Resource;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity violation: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Row lookups for the cached resources.
///
/// Rows are returned as JSON so the cache can store them verbatim.
#[async_trait]
pub trait ResourceRepo: Send + Sync {
    /// Every row of the resource's table as a JSON array, ordered by primary key.
    async fn list(&self, resource: Resource) -> Result<Value, RepoError>;

    async fn find(&self, resource: Resource, id: i64) -> Result<Option<Value>, RepoError>;

    /// First donation (lowest donation id) made by `user_id`.
    async fn find_donation_by_user(&self, user_id: i64) -> Result<Option<Value>, RepoError>;
}

/// Uncached writes to the resource tables. Nothing here touches the cache.
#[async_trait]
pub trait RecordRepo: ResourceRepo {
    /// Insert a row and return it as stored.
    async fn create(&self, fields: &RecordFields) -> Result<Value, RepoError>;

    /// Overwrite the given columns; `None` when no row has that key.
    async fn update(&self, id: i64, fields: &RecordFields) -> Result<Option<Value>, RepoError>;

    /// `false` when no row has that key.
    async fn delete(&self, resource: Resource, id: i64) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait DonorStatsRepo: Send + Sync {
    /// Totals for every user, zero-donation users included, ordered by total donated descending.
    async fn donor_totals(&self) -> Result<Vec<DonorTotals>, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    /// Round-trip a trivial query to prove the durable store is reachable.
    async fn ping(&self) -> Result<(), RepoError>;
}
