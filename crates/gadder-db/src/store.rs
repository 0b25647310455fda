use gadder_types::models::{Event, Message, Participant, Session, User};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store failed or could not be reached.
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// An insert collided with a unique index.
    #[error("unique constraint violated: {0}")]
    Conflict(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(err, msg) = &e {
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            {
                return StoreError::Conflict(msg.clone().unwrap_or_else(|| e.to_string()));
            }
        }
        StoreError::Unavailable(e.to_string())
    }
}

/// Offset/limit slice over a collection ordered by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFilter {
    All,
    Owner(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFilter {
    Owner(Uuid),
    Event(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantFilter {
    User(Uuid),
    Event(Uuid),
}

/// Typed record store consumed by the core.
///
/// Inserts assign a fresh id when the record carries the nil id and return
/// the stored record. Updates replace the whole row and report whether a row
/// matched. Listings are ordered by `created_at` ascending, ties broken by
/// insertion order.
pub trait RecordStore: Send + Sync {
    // -- Users --
    fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    fn users_by_facebook_id(&self, facebook_id: &str) -> Result<Vec<User>, StoreError>;
    fn get_users(&self, ids: &[Uuid]) -> Result<Vec<User>, StoreError>;
    fn list_users(&self, window: Window) -> Result<Vec<User>, StoreError>;
    fn insert_user(&self, user: &User) -> Result<User, StoreError>;
    fn update_user(&self, user: &User) -> Result<bool, StoreError>;
    fn delete_user(&self, id: Uuid) -> Result<bool, StoreError>;

    // -- Sessions --
    fn get_session(&self, id: Uuid) -> Result<Option<Session>, StoreError>;
    fn sessions_by_user(&self, user_id: Uuid) -> Result<Vec<Session>, StoreError>;
    fn insert_session(&self, session: &Session) -> Result<Session, StoreError>;

    // -- Events --
    fn get_event(&self, id: Uuid) -> Result<Option<Event>, StoreError>;
    fn get_events(&self, ids: &[Uuid]) -> Result<Vec<Event>, StoreError>;
    fn list_events(&self, filter: EventFilter, window: Window) -> Result<Vec<Event>, StoreError>;
    fn insert_event(&self, event: &Event) -> Result<Event, StoreError>;
    fn update_event(&self, event: &Event) -> Result<bool, StoreError>;
    fn delete_event(&self, id: Uuid) -> Result<bool, StoreError>;
    fn delete_events_by_owner(&self, user_id: Uuid) -> Result<usize, StoreError>;

    // -- Messages --
    fn get_message(&self, id: Uuid) -> Result<Option<Message>, StoreError>;
    fn list_messages(
        &self,
        filter: MessageFilter,
        window: Window,
    ) -> Result<Vec<Message>, StoreError>;
    fn insert_message(&self, message: &Message) -> Result<Message, StoreError>;
    fn update_message(&self, message: &Message) -> Result<bool, StoreError>;
    fn delete_message(&self, id: Uuid) -> Result<bool, StoreError>;
    fn delete_messages_by_owner(&self, user_id: Uuid) -> Result<usize, StoreError>;

    // -- Participants --
    fn get_participant(&self, id: Uuid) -> Result<Option<Participant>, StoreError>;
    fn list_participants(
        &self,
        filter: ParticipantFilter,
        window: Window,
    ) -> Result<Vec<Participant>, StoreError>;
    fn insert_participant(&self, participant: &Participant) -> Result<Participant, StoreError>;
    fn update_participant(&self, participant: &Participant) -> Result<bool, StoreError>;
    fn delete_participant(&self, id: Uuid) -> Result<bool, StoreError>;
}
