//! Cached donor leaderboard with an explicit force refresh.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tracing::info;

use crate::application::repos::{DonorStatsRepo, RepoError};
use crate::domain::leaderboard::{LeaderboardEntry, rank_donors};

use super::METRIC_LEADERBOARD_REFRESH;
use super::keys::CacheKey;
use super::resolver::{Source, read_cached, write_cached};
use super::store::CacheStore;

#[derive(Debug, Clone, PartialEq)]
pub struct Leaderboard {
    pub source: Source,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Clone)]
pub struct LeaderboardAggregator {
    store: Arc<dyn CacheStore>,
    repo: Arc<dyn DonorStatsRepo>,
    ttl: Duration,
}

impl LeaderboardAggregator {
    pub fn new(store: Arc<dyn CacheStore>, repo: Arc<dyn DonorStatsRepo>, ttl: Duration) -> Self {
        Self { store, repo, ttl }
    }

    /// Serve the cached board, computing and caching it on a miss.
    pub async fn get(&self) -> Result<Leaderboard, RepoError> {
        if let Some(entries) =
            read_cached::<Vec<LeaderboardEntry>>(self.store.as_ref(), &CacheKey::Leaderboard).await
        {
            return Ok(Leaderboard {
                source: Source::Cache,
                entries,
            });
        }

        let entries = self.compute_and_store().await?;
        Ok(Leaderboard {
            source: Source::Database,
            entries,
        })
    }

    /// Recompute the board and overwrite the cached entry without reading it.
    pub async fn refresh(&self) -> Result<Vec<LeaderboardEntry>, RepoError> {
        let entries = self.compute_and_store().await?;
        counter!(METRIC_LEADERBOARD_REFRESH).increment(1);
        info!(
            target = "cerahati::cache::leaderboard",
            donors = entries.len(),
            ttl_secs = self.ttl.as_secs(),
            "leaderboard cache refreshed"
        );
        Ok(entries)
    }

    async fn compute_and_store(&self) -> Result<Vec<LeaderboardEntry>, RepoError> {
        let entries = rank_donors(self.repo.donor_totals().await?);
        write_cached(
            self.store.as_ref(),
            &CacheKey::Leaderboard,
            entries.as_slice(),
            self.ttl,
        )
        .await;
        Ok(entries)
    }
}
