use thiserror::Error;

use crate::cache::CacheError;

/// Failures raised while bootstrapping or driving the process, before any request is served.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("failed to bind listener: {0}")]
    Bind(#[from] std::io::Error),
    #[error("database unavailable: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migrations failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("cache store unavailable: {0}")]
    Cache(#[from] CacheError),
    #[error("tracing subscriber: {0}")]
    Telemetry(String),
    #[error("missing configuration: {0}")]
    Configuration(&'static str),
}
