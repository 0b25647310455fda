use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use gadder_core::paginate;
use gadder_types::api::{
    CreateParticipantRequest, DeleteResponse, ListQuery, ParticipantWriteRequest, SessionRequest,
};

use crate::error::ApiError;
use crate::extract::ApiPath;
use crate::events::EventPath;
use crate::state::{AppState, blocking};

#[derive(Debug, Deserialize)]
pub struct ParticipantPath {
    pub participant_id: Uuid,
}

/// Join request by the session user, or an invitation when the body names
/// another `user_id`.
pub async fn create_participant(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<EventPath>,
    Json(req): Json<CreateParticipantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let participant = blocking(&state, move |core| {
        core.participants
            .create(&req.sid, path.event_id, req.user_id, &req.participant)
    })
    .await?;

    Ok(Json(json!({ "participant": participant })))
}

pub async fn list_event_participants(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<EventPath>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = paginate(query.page.as_deref(), query.per.as_deref())?;
    let sid = query.sid.unwrap_or_default();
    let listing = blocking(&state, move |core| {
        core.participants.list_for_event(&sid, path.event_id, page)
    })
    .await?;

    Ok(Json(json!({
        "participants": listing.items,
        "page": listing.page.page.to_string(),
        "per": listing.page.per.to_string(),
    })))
}

pub async fn show_participant(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<ParticipantPath>,
) -> Result<impl IntoResponse, ApiError> {
    let participant =
        blocking(&state, move |core| core.participants.show(path.participant_id)).await?;
    Ok(Json(json!({ "participant": participant })))
}

pub async fn update_participant(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<ParticipantPath>,
    Json(req): Json<ParticipantWriteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (participant, changed) = blocking(&state, move |core| {
        core.participants
            .update(&req.sid, path.participant_id, &req.participant)
    })
    .await?;

    Ok(Json(json!({ "participant": participant, "changed": changed })))
}

pub async fn delete_participant(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<ParticipantPath>,
    Json(req): Json<SessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |core| {
        core.participants.delete(&req.sid, path.participant_id)
    })
    .await?;

    Ok(Json(DeleteResponse { result: true }))
}

pub async fn list_my_participants(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = paginate(query.page.as_deref(), query.per.as_deref())?;
    let sid = query.sid.unwrap_or_default();
    let listing = blocking(&state, move |core| {
        core.participants.list_for_current_user(&sid, page)
    })
    .await?;

    Ok(Json(json!({
        "participants": listing.items,
        "page": listing.page.page.to_string(),
        "per": listing.page.per.to_string(),
    })))
}
