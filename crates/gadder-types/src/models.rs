use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_REQUEST_STATUS: &str = "requested";
pub const DEFAULT_RESPONSE_STATUS: &str = "pending";

/// A signed-in account. `Default` is the zero-valued placeholder used when a
/// participant row points at a user that no longer exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub avatar: String,
    pub bio: String,
    /// Sign-in key. Never leaves the server.
    #[serde(skip_serializing, default)]
    pub facebook_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    #[serde(rename = "user_id")]
    pub owner_user_id: Uuid,
    pub title: String,
    pub description: String,
    pub picture_url: String,
    pub privacy_level: i64,
    pub location: GeoPoint,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Messages are posted under exactly one event and owned by their author.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    #[serde(rename = "user_id")]
    pub owner_user_id: Uuid,
    pub event_id: Uuid,
    pub content: String,
    pub references: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Join row between a user and an event. Both statuses are free-form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub request_status: String,
    pub response_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Participant row with its event and user merged in at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedParticipant {
    #[serde(flatten)]
    pub participant: Participant,
    pub event: Event,
    pub user: User,
}
