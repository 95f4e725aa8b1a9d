use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::error::ErrorReport;
use crate::cache::ConnectionState;

use super::state::AppState;

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    database: &'static str,
    cache: ConnectionState,
    cache_routes: bool,
}

/// Liveness of both stores; only the database decides the status code.
pub async fn health(State(state): State<AppState>) -> Response {
    let database = state.health.ping().await;
    let body = HealthBody {
        status: if database.is_ok() { "ok" } else { "degraded" },
        database: if database.is_ok() { "up" } else { "down" },
        cache: state.monitor.state(),
        cache_routes: state.cache.is_open(),
    };

    match database {
        Ok(()) => (StatusCode::OK, Json(body)).into_response(),
        Err(err) => {
            let status = StatusCode::SERVICE_UNAVAILABLE;
            let mut response = (status, Json(body)).into_response();
            ErrorReport::from_error("infra::http::health", status, &err).attach(&mut response);
            response
        }
    }
}
