use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use gadder_core::paginate;
use gadder_types::api::{
    DeleteResponse, ListQuery, SessionRequest, SignInRequest, SignInResponse, UpdateUserRequest,
};

use crate::error::ApiError;
use crate::extract::ApiPath;
use crate::state::{AppState, blocking};

#[derive(Debug, Deserialize)]
pub struct UserPath {
    pub user_id: Uuid,
}

/// Signs in with a facebook id, creating the user on first contact.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, session) =
        blocking(&state, move |core| core.users.sign_in(&req.facebook_id, &req.user)).await?;

    info!("User {} signed in", user.id);
    Ok(Json(SignInResponse {
        user,
        sid: session.id.to_string(),
    }))
}

pub async fn show_user(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<UserPath>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(&state, move |core| core.users.show(path.user_id)).await?;
    Ok(Json(json!({ "user": user })))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = paginate(query.page.as_deref(), query.per.as_deref())?;
    let listing = blocking(&state, move |core| core.users.list(page)).await?;

    Ok(Json(json!({
        "users": listing.items,
        "page": listing.page.page.to_string(),
        "per": listing.page.per.to_string(),
    })))
}

pub async fn update_user(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<UserPath>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, changed) = blocking(&state, move |core| {
        core.users.update(&req.sid, path.user_id, &req.user)
    })
    .await?;

    Ok(Json(json!({ "user": user, "changed": changed })))
}

pub async fn delete_user(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<UserPath>,
    Json(req): Json<SessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |core| core.users.delete(&req.sid, path.user_id)).await?;
    Ok(Json(DeleteResponse { result: true }))
}
