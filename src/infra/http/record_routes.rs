//! Plain resource endpoints. They read and write Postgres directly and leave
//! the cache alone, so `/cache` views stay stale until their TTL runs out.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::domain::records::{RecordEvent, RecordFields};
use crate::domain::resources::Resource;

use super::error::RecordApiError;
use super::state::AppState;

#[derive(Debug, Serialize)]
struct Created {
    message: String,
    id: Value,
}

#[derive(Debug, Serialize)]
struct Done {
    message: String,
}

pub fn router() -> Router<AppState> {
    let mut router = Router::new();

    for resource in Resource::ALL {
        let base = format!("/{}", resource.route_segment());
        router = router
            .route(
                &base,
                get(move |state: State<AppState>| list(state, resource)).post(
                    move |state: State<AppState>, Json(payload): Json<Map<String, Value>>| {
                        create(state, resource, payload)
                    },
                ),
            )
            .route(
                &format!("{base}/{{id}}"),
                get(move |state: State<AppState>, Path(id): Path<i64>| {
                    show(state, resource, id)
                })
                .put(
                    move |state: State<AppState>,
                          Path(id): Path<i64>,
                          Json(payload): Json<Map<String, Value>>| {
                        update(state, resource, id, payload)
                    },
                )
                .delete(move |state: State<AppState>, Path(id): Path<i64>| {
                    delete(state, resource, id)
                }),
            );
    }

    router
}

async fn list(
    State(state): State<AppState>,
    resource: Resource,
) -> Result<impl IntoResponse, RecordApiError> {
    let rows = state.records.list(resource).await?;
    Ok(Json(rows))
}

async fn show(
    State(state): State<AppState>,
    resource: Resource,
    id: i64,
) -> Result<impl IntoResponse, RecordApiError> {
    match state.records.find(resource, id).await? {
        Some(row) => Ok(Json(row)),
        None => Err(RecordApiError::Missing(resource)),
    }
}

async fn create(
    State(state): State<AppState>,
    resource: Resource,
    payload: Map<String, Value>,
) -> Result<impl IntoResponse, RecordApiError> {
    let fields = RecordFields::for_create(resource, payload)?;
    let row = state.records.create(&fields).await?;
    let id = row
        .get(resource.primary_key())
        .cloned()
        .unwrap_or(Value::Null);

    info!(
        target = "cerahati::http::records",
        resource = resource.table(),
        id = %id,
        "record created"
    );
    Ok((
        StatusCode::CREATED,
        Json(Created {
            message: RecordEvent::Created.message(resource),
            id,
        }),
    ))
}

async fn update(
    State(state): State<AppState>,
    resource: Resource,
    id: i64,
    payload: Map<String, Value>,
) -> Result<impl IntoResponse, RecordApiError> {
    let fields = RecordFields::for_update(resource, payload)?;
    match state.records.update(id, &fields).await? {
        Some(_) => {
            info!(
                target = "cerahati::http::records",
                resource = resource.table(),
                id,
                "record updated"
            );
            Ok(Json(Done {
                message: RecordEvent::Updated.message(resource),
            }))
        }
        None => Err(RecordApiError::Missing(resource)),
    }
}

async fn delete(
    State(state): State<AppState>,
    resource: Resource,
    id: i64,
) -> Result<impl IntoResponse, RecordApiError> {
    if !state.records.delete(resource, id).await? {
        return Err(RecordApiError::Missing(resource));
    }

    info!(
        target = "cerahati::http::records",
        resource = resource.table(),
        id,
        "record deleted"
    );
    Ok(Json(Done {
        message: RecordEvent::Deleted.message(resource),
    }))
}
