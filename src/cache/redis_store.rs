use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, RedisError};
use tracing::warn;

use super::config::CacheConfig;
use super::connection::{ConnectionMonitor, ConnectionState, connect_with_backoff};
use super::store::{CacheError, CacheStore};

/// Redis-backed [`CacheStore`] sharing one multiplexed connection.
///
/// `ConnectionManager` is cheap to clone and reconnects on its own; the
/// monitor mirrors what the last command observed.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    monitor: ConnectionMonitor,
}

/// Mirror a command outcome onto `monitor` and map the error.
fn observe<T>(monitor: &ConnectionMonitor, result: Result<T, RedisError>) -> Result<T, CacheError> {
    match result {
        Ok(value) => {
            monitor.set(ConnectionState::Connected);
            Ok(value)
        }
        Err(err) => {
            if is_connection_error(&err) {
                monitor.record_failure();
            }
            Err(CacheError::from(err))
        }
    }
}

/// Open the configured Redis connection, retrying until it succeeds.
///
/// Only an unparsable URL is returned as an error.
pub async fn connect(
    config: &CacheConfig,
    monitor: ConnectionMonitor,
) -> Result<RedisStore, CacheError> {
    let client = redis::Client::open(config.redis_url.as_str())
        .map_err(|err| CacheError::Configuration(err.to_string()))?;

    let manager_config = ConnectionManagerConfig::new()
        .set_connection_timeout(config.connection_timeout())
        .set_response_timeout(config.response_timeout());

    let conn = connect_with_backoff(config.backoff(), &monitor, || {
        ConnectionManager::new_with_config(client.clone(), manager_config.clone())
    })
    .await;

    Ok(RedisStore { conn, monitor })
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        let result = conn.get::<_, Option<String>>(key).await;
        observe(&self.monitor, result)
    }

    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        // SETEX rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        let result = conn.set_ex::<_, _, ()>(key, value, seconds).await;
        observe(&self.monitor, result)
    }
}

fn is_connection_error(err: &RedisError) -> bool {
    err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_io_error()
        || err.is_timeout()
}

impl From<RedisError> for CacheError {
    fn from(err: RedisError) -> Self {
        if is_connection_error(&err) {
            warn!(
                target = "cerahati::cache::redis",
                error = %err,
                "redis connection error"
            );
            CacheError::Unavailable(err.to_string())
        } else {
            CacheError::Command(err.to_string())
        }
    }
}
