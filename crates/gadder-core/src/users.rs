use chrono::Utc;
use gadder_db::{RecordStore, StoreError};
use gadder_types::api::UserChanges;
use gadder_types::models::{Session, User};
use tracing::{debug, info};
use uuid::Uuid;

use crate::mutate::{PartialUpdate, apply_partial_update};
use crate::session::SessionResolver;
use crate::{CoreError, Listing, Page, Result, SharedStore};

#[derive(Clone)]
pub struct UserService {
    store: SharedStore,
    sessions: SessionResolver,
}

impl UserService {
    pub fn new(store: SharedStore) -> Self {
        Self {
            sessions: SessionResolver::new(store.clone()),
            store,
        }
    }

    /// Signs in by facebook id, creating the user on first sign-in. Repeat
    /// sign-ins return the stored user untouched, along with its session.
    pub fn sign_in(&self, facebook_id: &str, profile: &UserChanges) -> Result<(User, Session)> {
        let facebook_id = facebook_id.trim();
        if facebook_id.is_empty() {
            return Err(CoreError::InvalidParam("facebook_id is required".into()));
        }

        let user = match self.find_by_facebook_id(facebook_id)? {
            Some(existing) => existing,
            None => self.create(facebook_id, profile)?,
        };

        let session = self.sessions.get_or_create_session(user.id)?;
        Ok((user, session))
    }

    pub fn show(&self, id: Uuid) -> Result<User> {
        self.store.get_user(id)?.ok_or(CoreError::NotFound("user"))
    }

    pub fn list(&self, page: Page) -> Result<Listing<User>> {
        let items = self.store.list_users(page.window())?;
        Ok(Listing { items, page })
    }

    pub fn update(&self, sid: &str, id: Uuid, changes: &UserChanges) -> Result<(User, bool)> {
        let user = self.sessions.resolve(sid, Some(id))?;

        let (user, changed) = apply_partial_update(user, changes);
        if changed {
            self.store.update_user(&user)?;
        }
        Ok((user, changed))
    }

    /// Deletes the user with their events and messages. Participant rows
    /// naming the user are kept and embed as placeholders afterwards.
    ///
    /// The user row goes last so a failed cascade can be retried with the
    /// same session.
    pub fn delete(&self, sid: &str, id: Uuid) -> Result<()> {
        let user = self.sessions.resolve(sid, Some(id))?;

        let events = self.store.delete_events_by_owner(user.id)?;
        let messages = self.store.delete_messages_by_owner(user.id)?;
        self.store.delete_user(user.id)?;

        info!(
            "Deleted user {} with {} events and {} messages",
            user.id, events, messages
        );
        Ok(())
    }

    fn find_by_facebook_id(&self, facebook_id: &str) -> Result<Option<User>> {
        Ok(self.store.users_by_facebook_id(facebook_id)?.into_iter().next())
    }

    fn create(&self, facebook_id: &str, profile: &UserChanges) -> Result<User> {
        let now = Utc::now();
        let mut draft = User {
            facebook_id: facebook_id.to_string(),
            created_at: now,
            updated_at: now,
            ..User::default()
        };
        draft.apply_changes(profile);

        match self.store.insert_user(&draft) {
            Ok(user) => {
                info!("Created user {}", user.id);
                Ok(user)
            }
            // Lost a race with a concurrent first sign-in.
            Err(StoreError::Conflict(detail)) => {
                debug!("User for facebook id created concurrently ({})", detail);
                self.find_by_facebook_id(facebook_id)?
                    .ok_or(CoreError::StoreUnavailable(StoreError::Conflict(detail)))
            }
            Err(e) => Err(e.into()),
        }
    }
}
