use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use gadder_core::paginate;
use gadder_types::api::{DeleteResponse, EventWriteRequest, ListQuery, SessionRequest};

use crate::error::ApiError;
use crate::extract::ApiPath;
use crate::state::{AppState, blocking};
use crate::users::UserPath;

#[derive(Debug, Deserialize)]
pub struct UserEventPath {
    pub user_id: Uuid,
    pub event_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct EventPath {
    pub event_id: Uuid,
}

pub async fn create_event(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<UserPath>,
    Json(req): Json<EventWriteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let event = blocking(&state, move |core| {
        core.events.create(&req.sid, path.user_id, &req.event)
    })
    .await?;

    Ok(Json(json!({ "event": event })))
}

pub async fn update_event(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<UserEventPath>,
    Json(req): Json<EventWriteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (event, changed) = blocking(&state, move |core| {
        core.events
            .update(&req.sid, path.user_id, path.event_id, &req.event)
    })
    .await?;

    Ok(Json(json!({ "event": event, "changed": changed })))
}

pub async fn delete_event(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<UserEventPath>,
    Json(req): Json<SessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |core| {
        core.events.delete(&req.sid, path.user_id, path.event_id)
    })
    .await?;

    Ok(Json(DeleteResponse { result: true }))
}

/// The user's own events; the session must belong to that user.
pub async fn list_user_events(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<UserPath>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = paginate(query.page.as_deref(), query.per.as_deref())?;
    let sid = query.sid.unwrap_or_default();
    let listing = blocking(&state, move |core| {
        core.events.list_for_user(&sid, path.user_id, page)
    })
    .await?;

    Ok(Json(json!({
        "events": listing.items,
        "page": listing.page.page.to_string(),
        "per": listing.page.per.to_string(),
    })))
}

pub async fn show_event(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<EventPath>,
) -> Result<impl IntoResponse, ApiError> {
    let event = blocking(&state, move |core| core.events.show(path.event_id)).await?;
    Ok(Json(json!({ "event": event })))
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = paginate(query.page.as_deref(), query.per.as_deref())?;
    let listing = blocking(&state, move |core| core.events.list(page)).await?;

    Ok(Json(json!({
        "events": listing.items,
        "page": listing.page.page.to_string(),
        "per": listing.page.per.to_string(),
    })))
}
