use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::User;

// -- Change sets --
//
// Every field is an optional raw string: absent means "leave untouched".
// Numeric and date fields stay textual here and are parsed by the mutators.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub picture_url: Option<String>,
    pub privacy_level: Option<String>,
    pub lon: Option<String>,
    pub lat: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageChanges {
    pub content: Option<String>,
    pub references: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParticipantChanges {
    pub request_status: Option<String>,
    pub response_status: Option<String>,
}

// -- Users --

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub facebook_id: String,
    #[serde(default)]
    pub user: UserChanges,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub user: User,
    pub sid: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub sid: String,
    #[serde(default)]
    pub user: UserChanges,
}

// -- Events --

#[derive(Debug, Deserialize)]
pub struct EventWriteRequest {
    #[serde(default)]
    pub sid: String,
    #[serde(default)]
    pub event: EventChanges,
}

// -- Messages --

#[derive(Debug, Deserialize)]
pub struct MessageWriteRequest {
    #[serde(default)]
    pub sid: String,
    #[serde(default)]
    pub message: MessageChanges,
}

// -- Participants --

/// Without `user_id` the session user asks to join the event; with another
/// user's id the session user (the event owner) invites that user.
#[derive(Debug, Deserialize)]
pub struct CreateParticipantRequest {
    #[serde(default)]
    pub sid: String,
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub participant: ParticipantChanges,
}

#[derive(Debug, Deserialize)]
pub struct ParticipantWriteRequest {
    #[serde(default)]
    pub sid: String,
    #[serde(default)]
    pub participant: ParticipantChanges,
}

// -- Shared --

/// Body of delete requests, which only carry the session id.
#[derive(Debug, Default, Deserialize)]
pub struct SessionRequest {
    #[serde(default)]
    pub sid: String,
}

/// Query string of listing endpoints. `page` and `per` are kept raw so the
/// pagination engine can reject non-numeric input itself.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub sid: Option<String>,
    pub page: Option<String>,
    pub per: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub result: bool,
}
