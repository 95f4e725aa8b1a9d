//! Cache key schema and TTL policy.
//!
//! The rendered key strings are shared with other deployed clients of the same
//! Redis instance and must not change.

use std::fmt;
use std::time::Duration;

use crate::domain::resources::Resource;

pub const LEADERBOARD_KEY: &str = "donatur:leaderboard";

const DEFAULT_RESOURCE_TTL: Duration = Duration::from_secs(300);
const DEFAULT_LEADERBOARD_TTL: Duration = Duration::from_secs(3600);

/// Identifies one entry in the volatile store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Every row of a resource.
    Collection(Resource),
    /// A single row looked up by primary key.
    Item(Resource, i64),
    /// The first donation made by a user.
    DonationsByUser(i64),
    /// The ranked donor board.
    Leaderboard,
}

impl CacheKey {
    pub fn collection_prefix(resource: Resource) -> &'static str {
        match resource {
            Resource::Users => "users",
            Resource::Bookmarks => "bookmark",
            Resource::Prayers => "doa",
            Resource::Donations => "donasi",
            Resource::Orphanages => "panti",
        }
    }

    pub fn item_prefix(resource: Resource) -> &'static str {
        match resource {
            Resource::Users => "user",
            Resource::Bookmarks => "bookmark",
            Resource::Prayers => "doa",
            Resource::Donations => "donasi",
            Resource::Orphanages => "panti",
        }
    }

    pub fn resource(&self) -> Option<Resource> {
        match self {
            CacheKey::Collection(resource) | CacheKey::Item(resource, _) => Some(*resource),
            CacheKey::DonationsByUser(_) => Some(Resource::Donations),
            CacheKey::Leaderboard => None,
        }
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            CacheKey::Collection(_) => "collection",
            CacheKey::Item(..) => "item",
            CacheKey::DonationsByUser(_) => "donations_by_user",
            CacheKey::Leaderboard => "leaderboard",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Collection(resource) => f.write_str(Self::collection_prefix(*resource)),
            CacheKey::Item(resource, id) => write!(f, "{}:{id}", Self::item_prefix(*resource)),
            CacheKey::DonationsByUser(user_id) => write!(f, "donasi:user:{user_id}"),
            CacheKey::Leaderboard => f.write_str(LEADERBOARD_KEY),
        }
    }
}

/// Expiration applied when an entry is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub resource: Duration,
    pub leaderboard: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            resource: DEFAULT_RESOURCE_TTL,
            leaderboard: DEFAULT_LEADERBOARD_TTL,
        }
    }
}

impl TtlPolicy {
    pub fn ttl_for(&self, key: &CacheKey) -> Duration {
        match key {
            CacheKey::Leaderboard => self.leaderboard,
            _ => self.resource,
        }
    }
}
