//! Donor leaderboard: per-user donation totals ranked by amount.

use serde::{Deserialize, Serialize};

/// Aggregated donation totals for one user as returned by the durable store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonorTotals {
    pub user_id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub total_donation: i64,
    pub total_transactions: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub total_donation: i64,
    pub total_transactions: i64,
}

/// Assign 1-based ranks in the order the totals were delivered.
///
/// The input must already be sorted by `total_donation` descending; ties keep
/// the store's row order.
pub fn rank_donors(totals: Vec<DonorTotals>) -> Vec<LeaderboardEntry> {
    totals
        .into_iter()
        .zip(1u32..)
        .map(|(donor, rank)| LeaderboardEntry {
            rank,
            user_id: donor.user_id,
            name: donor.name,
            email: donor.email,
            total_donation: donor.total_donation,
            total_transactions: donor.total_transactions,
        })
        .collect()
}
