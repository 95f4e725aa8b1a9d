use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::error::ErrorReport;
use crate::application::repos::RepoError;
use crate::cache::ResolveError;
use crate::domain::records::{FieldsError, RecordEvent};
use crate::domain::resources::Resource;

const COLLECTION_FAILURE: &str = "Terjadi kesalahan server";
const ITEM_FAILURE: &str = "Server error";

pub const LEADERBOARD_GET_FAILURE: &str = "Failed to get leaderboard";
pub const LEADERBOARD_REFRESH_FAILURE: &str = "Failed to refresh leaderboard cache";

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct MessageBody {
    message: String,
}

#[derive(Debug, Serialize)]
struct LeaderboardErrorBody {
    status: &'static str,
    message: &'static str,
    error: String,
}

/// Error responses of the `/cache` routes, in the legacy envelope shapes.
#[derive(Debug)]
pub enum CacheApiError {
    Collection(ResolveError),
    Item(ResolveError),
    Leaderboard {
        message: &'static str,
        source: RepoError,
    },
}

impl CacheApiError {
    pub fn leaderboard(message: &'static str, source: RepoError) -> Self {
        Self::Leaderboard { message, source }
    }
}

impl IntoResponse for CacheApiError {
    fn into_response(self) -> Response {
        match self {
            CacheApiError::Collection(err) => resolve_failure(err, COLLECTION_FAILURE),
            CacheApiError::Item(err) => resolve_failure(err, ITEM_FAILURE),
            CacheApiError::Leaderboard { message, source } => {
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = LeaderboardErrorBody {
                    status: "error",
                    message,
                    error: source.to_string(),
                };
                let mut response = (status, Json(body)).into_response();
                ErrorReport::from_error("infra::http::cache::leaderboard", status, &source)
                    .attach(&mut response);
                response
            }
        }
    }
}

fn resolve_failure(err: ResolveError, server_message: &str) -> Response {
    let (status, message) = match &err {
        ResolveError::NotFound { resource, .. } => {
            (StatusCode::NOT_FOUND, resource.not_found_message())
        }
        ResolveError::Repo(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            server_message.to_string(),
        ),
    };

    let mut response = (status, Json(ErrorBody { error: message })).into_response();
    ErrorReport::from_error("infra::http::cache", status, &err).attach(&mut response);
    response
}

/// Error responses of the plain resource routes.
///
/// Rejected payloads and missing rows answer with `{"message"}`, database
/// failures with `{"error"}`.
#[derive(Debug)]
pub enum RecordApiError {
    Fields(FieldsError),
    Missing(Resource),
    Repo(RepoError),
}

impl From<FieldsError> for RecordApiError {
    fn from(err: FieldsError) -> Self {
        Self::Fields(err)
    }
}

impl From<RepoError> for RecordApiError {
    fn from(err: RepoError) -> Self {
        Self::Repo(err)
    }
}

impl IntoResponse for RecordApiError {
    fn into_response(self) -> Response {
        match self {
            RecordApiError::Fields(err) => {
                let status = StatusCode::BAD_REQUEST;
                let body = MessageBody {
                    message: err.to_string(),
                };
                let mut response = (status, Json(body)).into_response();
                ErrorReport::from_error("infra::http::records::payload", status, &err)
                    .attach(&mut response);
                response
            }
            RecordApiError::Missing(resource) => {
                let status = StatusCode::NOT_FOUND;
                let message = RecordEvent::Missing.message(resource);
                let mut response = (
                    status,
                    Json(MessageBody {
                        message: message.clone(),
                    }),
                )
                    .into_response();
                ErrorReport::from_message("infra::http::records", status, message)
                    .attach(&mut response);
                response
            }
            RecordApiError::Repo(err) => {
                let status = match &err {
                    RepoError::InvalidInput { .. } | RepoError::Integrity { .. } => {
                        StatusCode::BAD_REQUEST
                    }
                    RepoError::Duplicate { .. } => StatusCode::CONFLICT,
                    RepoError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
                    RepoError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let mut response = (
                    status,
                    Json(ErrorBody {
                        error: err.to_string(),
                    }),
                )
                    .into_response();
                ErrorReport::from_error("infra::http::records::repo", status, &err)
                    .attach(&mut response);
                response
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_errors_map_to_client_or_server_status() {
        let cases = [
            (
                RepoError::InvalidInput {
                    message: "invalid input syntax for type bigint".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                RepoError::Duplicate {
                    constraint: "users_username_key".into(),
                },
                StatusCode::CONFLICT,
            ),
            (RepoError::Timeout, StatusCode::SERVICE_UNAVAILABLE),
            (
                RepoError::Persistence("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            let response = RecordApiError::Repo(err).into_response();
            assert_eq!(response.status(), expected);
            let report = response
                .extensions()
                .get::<ErrorReport>()
                .expect("report attached");
            assert_eq!(report.source, "infra::http::records::repo");
        }
    }

    #[test]
    fn missing_rows_answer_404() {
        let response = RecordApiError::Missing(Resource::Bookmarks).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
