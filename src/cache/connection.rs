//! Lifecycle of the shared volatile-store connection.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
        }
    }

    /// State after a command fails on an established connection: the first
    /// failure starts reconnecting, a second one means the link is down.
    pub fn after_failure(self) -> ConnectionState {
        match self {
            ConnectionState::Connected => ConnectionState::Reconnecting,
            ConnectionState::Reconnecting | ConnectionState::Disconnected => {
                ConnectionState::Disconnected
            }
            ConnectionState::Connecting => ConnectionState::Connecting,
        }
    }
}

/// Publishes the current connection state to any number of observers.
#[derive(Clone)]
pub struct ConnectionMonitor {
    sender: Arc<watch::Sender<ConnectionState>>,
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionMonitor {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.sender.subscribe()
    }

    /// Record a transition; repeated reports of the same state are ignored.
    pub fn set(&self, next: ConnectionState) {
        self.transition(|_| next);
    }

    /// Record a failed command against the current state.
    pub fn record_failure(&self) {
        self.transition(ConnectionState::after_failure);
    }

    fn transition(&self, step: impl FnOnce(ConnectionState) -> ConnectionState) {
        let mut previous = ConnectionState::Disconnected;
        let mut next = ConnectionState::Disconnected;
        let changed = self.sender.send_if_modified(|state| {
            previous = *state;
            next = step(*state);
            if next == previous {
                return false;
            }
            *state = next;
            true
        });

        if changed {
            info!(
                target = "cerahati::cache::connection",
                from = previous.as_str(),
                to = next.as_str(),
                "cache connection state changed"
            );
        }
    }
}

/// Exponential reconnect delay: `initial * 2^attempt`, capped at `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max: max.max(initial),
        }
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        1u32.checked_shl(attempt)
            .and_then(|factor| self.initial.checked_mul(factor))
            .map_or(self.max, |delay| delay.min(self.max))
    }
}

/// Run `connect` until it succeeds, sleeping per `backoff` between failures.
///
/// Never gives up. The monitor reads `connecting` until the first success.
pub async fn connect_with_backoff<T, E, F, Fut>(
    backoff: Backoff,
    monitor: &ConnectionMonitor,
    mut connect: F,
) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt: u32 = 0;
    monitor.set(ConnectionState::Connecting);
    loop {
        match connect().await {
            Ok(connection) => {
                monitor.set(ConnectionState::Connected);
                return connection;
            }
            Err(err) => {
                let delay = backoff.delay(attempt);
                warn!(
                    target = "cerahati::cache::connection",
                    attempt = attempt + 1,
                    retry_in_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "cache connection attempt failed"
                );
                tokio::time::sleep(delay).await;
                attempt = attempt.saturating_add(1);
            }
        }
    }
}
