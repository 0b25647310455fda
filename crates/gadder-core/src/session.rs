use chrono::Utc;
use gadder_db::{RecordStore, StoreError};
use gadder_types::models::{Session, User};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{CoreError, Result, SharedStore};

/// Maps opaque session ids to users.
#[derive(Clone)]
pub struct SessionResolver {
    store: SharedStore,
}

impl SessionResolver {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Resolves `sid` to its user.
    ///
    /// With a `target` the target user is looked up as well and must be the
    /// session's user, which lets routes addressing "user X's resource" verify
    /// ownership in the same step.
    pub fn resolve(&self, sid: &str, target: Option<Uuid>) -> Result<User> {
        if sid.is_empty() {
            return Err(CoreError::MissingCredential);
        }

        // A malformed id can never match a stored session.
        let session_id =
            Uuid::parse_str(sid).map_err(|_| CoreError::SessionNotFound(sid.to_string()))?;

        let session = self
            .store
            .get_session(session_id)?
            .ok_or_else(|| CoreError::SessionNotFound(sid.to_string()))?;

        let session_user = self.store.get_user(session.user_id)?.ok_or_else(|| {
            warn!("Session {} points at missing user {}", session.id, session.user_id);
            CoreError::UserNotFound
        })?;

        let Some(target) = target else {
            return Ok(session_user);
        };

        let target_user = self
            .store
            .get_user(target)?
            .ok_or(CoreError::NotFound("user"))?;

        if session_user.id != target_user.id {
            debug!(
                "Session user {} does not match requested user {}",
                session_user.id, target_user.id
            );
            return Err(CoreError::IdentityMismatch);
        }

        Ok(target_user)
    }

    /// Returns the user's session, creating one on first use.
    ///
    /// Sessions are unique per user in the store, so two racing first calls
    /// cannot both insert; the loser re-reads and returns the winner's row.
    pub fn get_or_create_session(&self, user_id: Uuid) -> Result<Session> {
        if let Some(existing) = self.store.sessions_by_user(user_id)?.into_iter().next() {
            return Ok(existing);
        }

        let now = Utc::now();
        let draft = Session {
            id: Uuid::nil(),
            user_id,
            created_at: now,
            updated_at: now,
        };

        match self.store.insert_session(&draft) {
            Ok(session) => {
                info!("Created session for user {}", user_id);
                Ok(session)
            }
            Err(StoreError::Conflict(detail)) => {
                debug!("Session for user {} created concurrently ({})", user_id, detail);
                self.store
                    .sessions_by_user(user_id)?
                    .into_iter()
                    .next()
                    .ok_or(CoreError::StoreUnavailable(StoreError::Conflict(detail)))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Gadder;
    use crate::test_support::{sign_in, store};

    #[test]
    fn empty_sid_is_missing_credential() {
        let resolver = SessionResolver::new(store());
        assert!(matches!(
            resolver.resolve("", None),
            Err(CoreError::MissingCredential)
        ));
    }

    #[test]
    fn unknown_or_malformed_sid_is_session_not_found() {
        let resolver = SessionResolver::new(store());

        let unknown = Uuid::new_v4().to_string();
        assert!(matches!(
            resolver.resolve(&unknown, None),
            Err(CoreError::SessionNotFound(sid)) if sid == unknown
        ));
        assert!(matches!(
            resolver.resolve("not-a-session", None),
            Err(CoreError::SessionNotFound(_))
        ));
    }

    #[test]
    fn resolve_without_target_returns_session_owner() {
        let core = Gadder::new(store());
        let (alice, alice_sid) = sign_in(&core, "fb-alice");
        let (bob, bob_sid) = sign_in(&core, "fb-bob");

        assert_eq!(core.sessions.resolve(&alice_sid, None).unwrap().id, alice.id);
        assert_eq!(core.sessions.resolve(&bob_sid, None).unwrap().id, bob.id);
    }

    #[test]
    fn resolve_with_other_target_is_identity_mismatch() {
        let core = Gadder::new(store());
        let (alice, alice_sid) = sign_in(&core, "fb-alice");
        let (bob, _) = sign_in(&core, "fb-bob");

        assert!(matches!(
            core.sessions.resolve(&alice_sid, Some(bob.id)),
            Err(CoreError::IdentityMismatch)
        ));
        assert_eq!(
            core.sessions.resolve(&alice_sid, Some(alice.id)).unwrap().id,
            alice.id
        );
    }

    #[test]
    fn resolve_with_missing_target_is_not_found() {
        let core = Gadder::new(store());
        let (_, sid) = sign_in(&core, "fb-alice");

        assert!(matches!(
            core.sessions.resolve(&sid, Some(Uuid::new_v4())),
            Err(CoreError::NotFound("user"))
        ));
    }

    #[test]
    fn orphaned_session_is_user_not_found() {
        let store = store();
        let core = Gadder::new(store.clone());
        let (alice, sid) = sign_in(&core, "fb-alice");

        store.delete_user(alice.id).unwrap();

        assert!(matches!(
            core.sessions.resolve(&sid, None),
            Err(CoreError::UserNotFound)
        ));
    }

    #[test]
    fn get_or_create_session_is_idempotent() {
        let core = Gadder::new(store());
        let (alice, sid) = sign_in(&core, "fb-alice");

        let again = core.sessions.get_or_create_session(alice.id).unwrap();
        assert_eq!(again.id.to_string(), sid);
        assert_eq!(again.created_at, again.updated_at);
    }

    #[test]
    fn concurrent_first_sessions_converge() {
        let core = Gadder::new(store());
        let (alice, _) = sign_in(&core, "fb-alice");
        let bob = Uuid::new_v4();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sessions = core.sessions.clone();
                std::thread::spawn(move || sessions.get_or_create_session(bob).unwrap())
            })
            .collect();
        let ids: Vec<Uuid> = handles.into_iter().map(|h| h.join().unwrap().id).collect();

        assert!(ids.iter().all(|id| *id == ids[0]));
        assert_ne!(
            core.sessions.get_or_create_session(alice.id).unwrap().id,
            ids[0]
        );
    }
}
