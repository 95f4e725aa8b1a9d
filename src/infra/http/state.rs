use std::sync::{Arc, OnceLock};

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::application::error::ErrorReport;
use crate::application::repos::{HealthRepo, RecordRepo};
use crate::cache::{CacheServices, ConnectionMonitor};

/// Holds the cache services once the first store connection is up.
///
/// Until then every `/cache` route answers as if it were not registered.
#[derive(Clone, Default)]
pub struct CacheGate {
    services: Arc<OnceLock<Arc<CacheServices>>>,
}

impl CacheGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the gate was already open.
    pub fn open(&self, services: CacheServices) -> bool {
        let opened = self.services.set(Arc::new(services)).is_ok();
        if opened {
            info!(target = "cerahati::http::cache", "cache routes enabled");
        }
        opened
    }

    pub fn is_open(&self) -> bool {
        self.services.get().is_some()
    }

    pub fn get(&self) -> Option<Arc<CacheServices>> {
        self.services.get().cloned()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub cache: CacheGate,
    pub monitor: ConnectionMonitor,
    pub health: Arc<dyn HealthRepo>,
    /// Uncached reads and writes for the plain resource routes.
    pub records: Arc<dyn RecordRepo>,
}

/// Extracts the cache services, rejecting with 404 while the gate is closed.
pub struct ReadyCache(pub Arc<CacheServices>);

impl FromRequestParts<AppState> for ReadyCache {
    type Rejection = Response;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state.cache.get().map(ReadyCache).ok_or_else(|| {
            let mut response = StatusCode::NOT_FOUND.into_response();
            ErrorReport::from_message(
                "infra::http::cache::gate",
                StatusCode::NOT_FOUND,
                "cache store not connected yet",
            )
            .attach(&mut response);
            response
        })
    }
}
