use chrono::Utc;
use gadder_db::{EventFilter, RecordStore};
use gadder_types::api::EventChanges;
use gadder_types::models::Event;
use tracing::info;
use uuid::Uuid;

use crate::authz::authorize;
use crate::mutate::{PartialUpdate, apply_partial_update};
use crate::session::SessionResolver;
use crate::{CoreError, Listing, Page, Result, SharedStore};

#[derive(Clone)]
pub struct EventService {
    store: SharedStore,
    sessions: SessionResolver,
}

impl EventService {
    pub fn new(store: SharedStore) -> Self {
        Self {
            sessions: SessionResolver::new(store.clone()),
            store,
        }
    }

    /// Creates an event owned by `user_id`, who must be the session's user.
    pub fn create(&self, sid: &str, user_id: Uuid, changes: &EventChanges) -> Result<Event> {
        let user = self.sessions.resolve(sid, Some(user_id))?;

        let now = Utc::now();
        let mut draft = Event {
            owner_user_id: user.id,
            created_at: now,
            updated_at: now,
            ..Event::default()
        };
        draft.apply_changes(changes);

        let event = self.store.insert_event(&draft)?;
        info!("User {} created event {}", user.id, event.id);
        Ok(event)
    }

    pub fn update(
        &self,
        sid: &str,
        user_id: Uuid,
        id: Uuid,
        changes: &EventChanges,
    ) -> Result<(Event, bool)> {
        let user = self.sessions.resolve(sid, Some(user_id))?;
        let event = self.find(id)?;
        authorize(&user, &event)?;

        let (event, changed) = apply_partial_update(event, changes);
        if changed {
            self.store.update_event(&event)?;
        }
        Ok((event, changed))
    }

    pub fn delete(&self, sid: &str, user_id: Uuid, id: Uuid) -> Result<()> {
        let user = self.sessions.resolve(sid, Some(user_id))?;
        let event = self.find(id)?;
        authorize(&user, &event)?;

        self.store.delete_event(event.id)?;
        info!("User {} deleted event {}", user.id, event.id);
        Ok(())
    }

    pub fn show(&self, id: Uuid) -> Result<Event> {
        self.find(id)
    }

    pub fn list(&self, page: Page) -> Result<Listing<Event>> {
        let items = self.store.list_events(EventFilter::All, page.window())?;
        Ok(Listing { items, page })
    }

    /// Events owned by `user_id`, visible only to that user's session.
    pub fn list_for_user(&self, sid: &str, user_id: Uuid, page: Page) -> Result<Listing<Event>> {
        let user = self.sessions.resolve(sid, Some(user_id))?;
        let items = self
            .store
            .list_events(EventFilter::Owner(user.id), page.window())?;
        Ok(Listing { items, page })
    }

    fn find(&self, id: Uuid) -> Result<Event> {
        self.store.get_event(id)?.ok_or(CoreError::NotFound("event"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Gadder;
    use crate::test_support::{sign_in, store};
    use gadder_types::models::GeoPoint;

    fn titled(title: &str) -> EventChanges {
        EventChanges {
            title: Some(title.into()),
            description: Some("Conference".into()),
            ..EventChanges::default()
        }
    }

    #[test]
    fn create_stamps_owner_and_equal_timestamps() {
        let core = Gadder::new(store());
        let (alice, sid) = sign_in(&core, "fb-alice");
        let changes = EventChanges {
            lon: Some("-75.1641667".into()),
            lat: Some("39.9522222".into()),
            privacy_level: Some("nope".into()),
            ..titled("Test")
        };

        let event = core.events.create(&sid, alice.id, &changes).unwrap();

        assert_eq!(event.owner_user_id, alice.id);
        assert_eq!(event.title, "Test");
        assert_eq!(event.privacy_level, 0);
        assert_eq!(
            event.location,
            GeoPoint {
                lon: -75.1641667,
                lat: 39.9522222
            }
        );
        assert_eq!(event.created_at, event.updated_at);
        assert_eq!(core.events.show(event.id).unwrap(), event);
    }

    #[test]
    fn create_for_another_user_is_identity_mismatch() {
        let core = Gadder::new(store());
        let (_, alice_sid) = sign_in(&core, "fb-alice");
        let (bob, _) = sign_in(&core, "fb-bob");

        assert!(matches!(
            core.events.create(&alice_sid, bob.id, &titled("x")),
            Err(CoreError::IdentityMismatch)
        ));
        assert!(core.events.list(Page::default()).unwrap().items.is_empty());
    }

    #[test]
    fn only_owner_updates_and_deletes() {
        let core = Gadder::new(store());
        let (alice, alice_sid) = sign_in(&core, "fb-alice");
        let (bob, bob_sid) = sign_in(&core, "fb-bob");
        let event = core.events.create(&alice_sid, alice.id, &titled("SXSW")).unwrap();

        // Bob addresses the event through his own user path: session checks
        // pass, ownership does not.
        assert!(matches!(
            core.events.update(&bob_sid, bob.id, event.id, &titled("mine now")),
            Err(CoreError::Forbidden)
        ));
        assert!(matches!(
            core.events.delete(&bob_sid, bob.id, event.id),
            Err(CoreError::Forbidden)
        ));
        assert_eq!(core.events.show(event.id).unwrap().title, "SXSW");

        let (updated, changed) = core
            .events
            .update(&alice_sid, alice.id, event.id, &titled("SXSW 2015"))
            .unwrap();
        assert!(changed);
        assert_eq!(core.events.show(event.id).unwrap(), updated);

        core.events.delete(&alice_sid, alice.id, event.id).unwrap();
        assert!(matches!(
            core.events.show(event.id),
            Err(CoreError::NotFound("event"))
        ));
    }

    #[test]
    fn update_missing_event_is_not_found() {
        let core = Gadder::new(store());
        let (alice, sid) = sign_in(&core, "fb-alice");

        assert!(matches!(
            core.events.update(&sid, alice.id, Uuid::new_v4(), &titled("x")),
            Err(CoreError::NotFound("event"))
        ));
    }

    #[test]
    fn list_for_user_only_returns_own_events() {
        let core = Gadder::new(store());
        let (alice, alice_sid) = sign_in(&core, "fb-alice");
        let (bob, bob_sid) = sign_in(&core, "fb-bob");
        for title in ["a1", "a2", "a3"] {
            core.events.create(&alice_sid, alice.id, &titled(title)).unwrap();
        }
        core.events.create(&bob_sid, bob.id, &titled("b1")).unwrap();

        let page = Page { page: 1, per: 2 };
        let mine = core.events.list_for_user(&alice_sid, alice.id, page).unwrap();
        let titles: Vec<_> = mine.items.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["a1", "a2"]);

        assert_eq!(core.events.list(Page::default()).unwrap().items.len(), 4);
        assert!(matches!(
            core.events.list_for_user(&bob_sid, alice.id, page),
            Err(CoreError::IdentityMismatch)
        ));
    }
}
