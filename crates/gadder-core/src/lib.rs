//! Session-based authorization and relational access for the gadder API.
//!
//! Every component takes the shared record store at construction; nothing in
//! this crate holds global state. Operations are synchronous and each store
//! call is an independent round-trip, so callers on an async runtime should
//! run them on a blocking thread.

pub mod authz;
pub mod embed;
pub mod error;
pub mod events;
pub mod messages;
pub mod mutate;
pub mod pagination;
pub mod participants;
pub mod session;
pub mod users;

use std::sync::Arc;

use gadder_db::RecordStore;

pub use error::{CoreError, Result};
pub use pagination::{Listing, Page, paginate};

use crate::events::EventService;
use crate::messages::MessageService;
use crate::participants::ParticipantService;
use crate::session::SessionResolver;
use crate::users::UserService;

pub type SharedStore = Arc<dyn RecordStore>;

/// All entity services wired to one store handle.
#[derive(Clone)]
pub struct Gadder {
    pub sessions: SessionResolver,
    pub users: UserService,
    pub events: EventService,
    pub messages: MessageService,
    pub participants: ParticipantService,
}

impl Gadder {
    pub fn new(store: SharedStore) -> Self {
        Self {
            sessions: SessionResolver::new(store.clone()),
            users: UserService::new(store.clone()),
            events: EventService::new(store.clone()),
            messages: MessageService::new(store.clone()),
            participants: ParticipantService::new(store),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use gadder_db::Database;
    use gadder_types::api::UserChanges;
    use gadder_types::models::User;

    use crate::{Gadder, SharedStore};

    pub fn store() -> SharedStore {
        Arc::new(Database::open_in_memory().unwrap())
    }

    /// Signs a user in and returns it with its session id.
    pub fn sign_in(core: &Gadder, facebook_id: &str) -> (User, String) {
        let changes = UserChanges {
            first_name: Some(facebook_id.to_uppercase()),
            ..UserChanges::default()
        };
        let (user, session) = core.users.sign_in(facebook_id, &changes).unwrap();
        (user, session.id.to_string())
    }
}
