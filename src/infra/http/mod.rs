//! HTTP surface: `/health`, the `/cache` routes and the plain resource routes.

mod cache_routes;
mod error;
mod health;
mod middleware;
mod record_routes;
mod state;

pub use error::{CacheApiError, RecordApiError};
pub use middleware::{REQUEST_ID_HEADER, RequestId};
pub use state::{AppState, CacheGate, ReadyCache};

use axum::{Router, middleware::from_fn, routing::get};

use middleware::{assign_request_id, trace_responses};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .merge(cache_routes::router())
        .merge(record_routes::router())
        .with_state(state)
        .layer(from_fn(trace_responses))
        .layer(from_fn(assign_request_id))
}
