use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use gadder_core::paginate;
use gadder_types::api::{DeleteResponse, ListQuery, MessageWriteRequest, SessionRequest};

use crate::error::ApiError;
use crate::extract::ApiPath;
use crate::events::EventPath;
use crate::state::{AppState, blocking};

#[derive(Debug, Deserialize)]
pub struct MessagePath {
    pub message_id: Uuid,
}

pub async fn create_message(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<EventPath>,
    Json(req): Json<MessageWriteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = blocking(&state, move |core| {
        core.messages.create(&req.sid, path.event_id, &req.message)
    })
    .await?;

    Ok(Json(json!({ "message": message })))
}

pub async fn list_event_messages(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<EventPath>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = paginate(query.page.as_deref(), query.per.as_deref())?;
    let sid = query.sid.unwrap_or_default();
    let listing = blocking(&state, move |core| {
        core.messages.list_for_event(&sid, path.event_id, page)
    })
    .await?;

    Ok(Json(json!({
        "messages": listing.items,
        "page": listing.page.page.to_string(),
        "per": listing.page.per.to_string(),
    })))
}

pub async fn update_message(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<MessagePath>,
    Json(req): Json<MessageWriteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (message, changed) = blocking(&state, move |core| {
        core.messages.update(&req.sid, path.message_id, &req.message)
    })
    .await?;

    Ok(Json(json!({ "message": message, "changed": changed })))
}

pub async fn delete_message(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<MessagePath>,
    Json(req): Json<SessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |core| core.messages.delete(&req.sid, path.message_id)).await?;
    Ok(Json(DeleteResponse { result: true }))
}

pub async fn list_my_messages(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = paginate(query.page.as_deref(), query.per.as_deref())?;
    let sid = query.sid.unwrap_or_default();
    let listing = blocking(&state, move |core| {
        core.messages.list_for_current_user(&sid, page)
    })
    .await?;

    Ok(Json(json!({
        "messages": listing.items,
        "page": listing.page.page.to_string(),
        "per": listing.page.per.to_string(),
    })))
}
