//! Cache configuration.
//!
//! Controls the volatile store backend, entry TTLs and the reconnect schedule
//! via the `[cache]` section of `cerahati.toml`.

use std::time::Duration;

use serde::Deserialize;

use super::connection::Backoff;
use super::keys::TtlPolicy;

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_RESOURCE_TTL_SECONDS: u64 = 300;
const DEFAULT_LEADERBOARD_TTL_SECONDS: u64 = 3600;
const DEFAULT_BACKOFF_INITIAL_MS: u64 = 100;
const DEFAULT_BACKOFF_MAX_MS: u64 = 10_000;
const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Redis,
    Memory,
}

impl CacheBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheBackend::Redis => "redis",
            CacheBackend::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub redis_url: String,
    /// TTL for resource collection and item entries.
    pub resource_ttl_seconds: u64,
    pub leaderboard_ttl_seconds: u64,
    /// First reconnect delay; doubled per failed attempt.
    pub backoff_initial_ms: u64,
    /// Ceiling for the reconnect delay.
    pub backoff_max_ms: u64,
    pub connection_timeout_ms: u64,
    pub response_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            resource_ttl_seconds: DEFAULT_RESOURCE_TTL_SECONDS,
            leaderboard_ttl_seconds: DEFAULT_LEADERBOARD_TTL_SECONDS,
            backoff_initial_ms: DEFAULT_BACKOFF_INITIAL_MS,
            backoff_max_ms: DEFAULT_BACKOFF_MAX_MS,
            connection_timeout_ms: DEFAULT_CONNECTION_TIMEOUT_MS,
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            backend: settings.backend,
            redis_url: settings.redis_url.clone(),
            resource_ttl_seconds: settings.resource_ttl.as_secs(),
            leaderboard_ttl_seconds: settings.leaderboard_ttl.as_secs(),
            backoff_initial_ms: duration_millis(settings.backoff_initial),
            backoff_max_ms: duration_millis(settings.backoff_max),
            connection_timeout_ms: duration_millis(settings.connection_timeout),
            response_timeout_ms: duration_millis(settings.response_timeout),
        }
    }
}

impl CacheConfig {
    pub fn ttl_policy(&self) -> TtlPolicy {
        TtlPolicy {
            resource: Duration::from_secs(self.resource_ttl_seconds.max(1)),
            leaderboard: Duration::from_secs(self.leaderboard_ttl_seconds.max(1)),
        }
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(
            Duration::from_millis(self.backoff_initial_ms.max(1)),
            Duration::from_millis(self.backoff_max_ms.max(self.backoff_initial_ms).max(1)),
        )
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

fn duration_millis(value: Duration) -> u64 {
    u64::try_from(value.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert_eq!(config.backend, CacheBackend::Redis);
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(config.resource_ttl_seconds, 300);
        assert_eq!(config.leaderboard_ttl_seconds, 3600);
        assert_eq!(config.ttl_policy(), TtlPolicy::default());
    }

    #[test]
    fn zero_ttl_clamps_to_one_second() {
        let config = CacheConfig {
            resource_ttl_seconds: 0,
            ..Default::default()
        };
        assert_eq!(config.ttl_policy().resource, Duration::from_secs(1));
    }

    #[test]
    fn backoff_ceiling_never_below_initial_delay() {
        let config = CacheConfig {
            backoff_initial_ms: 500,
            backoff_max_ms: 100,
            ..Default::default()
        };
        let backoff = config.backoff();
        assert_eq!(backoff.delay(0), Duration::from_millis(500));
        assert_eq!(backoff.delay(10), Duration::from_millis(500));
    }
}
