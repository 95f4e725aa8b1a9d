//! `/cache` endpoints: read-through views of each resource and the leaderboard.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Path,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

use crate::cache::{CacheServices, Resolved, Source};
use crate::domain::leaderboard::LeaderboardEntry;
use crate::domain::resources::Resource;

use super::error::{CacheApiError, LEADERBOARD_GET_FAILURE, LEADERBOARD_REFRESH_FAILURE};
use super::state::{AppState, ReadyCache};

const REFRESH_MESSAGE: &str = "Leaderboard cache refreshed successfully";

#[derive(Debug, Serialize)]
struct LeaderboardBody {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    data: Vec<LeaderboardEntry>,
}

pub fn router() -> Router<AppState> {
    let mut router = Router::new();

    for resource in Resource::ALL {
        let base = format!("/cache/{}", resource.route_segment());
        router = router
            .route(
                &base,
                get(move |ReadyCache(cache): ReadyCache| collection(cache, resource)),
            )
            .route(
                &format!("{base}/{{id}}"),
                get(move |ReadyCache(cache): ReadyCache, Path(id): Path<i64>| {
                    item(cache, resource, id)
                }),
            );
    }

    router
        .route("/cache/donation/users/{id}", get(donation_by_user))
        .route("/cache/leaderboard", get(leaderboard))
        .route("/cache/leaderboard/refresh", post(refresh_leaderboard))
}

async fn collection(cache: Arc<CacheServices>, resource: Resource) -> Response {
    match cache.resolver.resolve_collection(resource).await {
        Ok(resolved) => served(resolved),
        Err(err) => CacheApiError::Collection(err).into_response(),
    }
}

async fn item(cache: Arc<CacheServices>, resource: Resource, id: i64) -> Response {
    match cache.resolver.resolve_item(resource, id).await {
        Ok(resolved) => served(resolved),
        Err(err) => CacheApiError::Item(err).into_response(),
    }
}

async fn donation_by_user(ReadyCache(cache): ReadyCache, Path(user_id): Path<i64>) -> Response {
    match cache.resolver.resolve_donation_by_user(user_id).await {
        Ok(resolved) => served(resolved),
        Err(err) => CacheApiError::Item(err).into_response(),
    }
}

async fn leaderboard(ReadyCache(cache): ReadyCache) -> Response {
    match cache.leaderboard.get().await {
        Ok(board) => {
            let mut response = Json(LeaderboardBody {
                status: "success",
                message: None,
                data: board.entries,
            })
            .into_response();
            response.extensions_mut().insert(board.source);
            response
        }
        Err(err) => CacheApiError::leaderboard(LEADERBOARD_GET_FAILURE, err).into_response(),
    }
}

async fn refresh_leaderboard(ReadyCache(cache): ReadyCache) -> Response {
    match cache.leaderboard.refresh().await {
        Ok(entries) => {
            let mut response = Json(LeaderboardBody {
                status: "success",
                message: Some(REFRESH_MESSAGE),
                data: entries,
            })
            .into_response();
            response.extensions_mut().insert(Source::Database);
            response
        }
        Err(err) => CacheApiError::leaderboard(LEADERBOARD_REFRESH_FAILURE, err).into_response(),
    }
}

fn served(resolved: Resolved) -> Response {
    let source = resolved.source;
    let mut response = Json(resolved).into_response();
    response.extensions_mut().insert(source);
    response
}
