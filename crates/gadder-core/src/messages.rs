use chrono::Utc;
use gadder_db::{MessageFilter, RecordStore};
use gadder_types::api::MessageChanges;
use gadder_types::models::Message;
use tracing::info;
use uuid::Uuid;

use crate::authz::authorize;
use crate::mutate::{PartialUpdate, apply_partial_update};
use crate::session::SessionResolver;
use crate::{CoreError, Listing, Page, Result, SharedStore};

#[derive(Clone)]
pub struct MessageService {
    store: SharedStore,
    sessions: SessionResolver,
}

impl MessageService {
    pub fn new(store: SharedStore) -> Self {
        Self {
            sessions: SessionResolver::new(store.clone()),
            store,
        }
    }

    /// Posts a message under an event as the session user. Any signed-in
    /// user may post to an existing event.
    pub fn create(&self, sid: &str, event_id: Uuid, changes: &MessageChanges) -> Result<Message> {
        let event = self
            .store
            .get_event(event_id)?
            .ok_or(CoreError::NotFound("event"))?;
        let user = self.sessions.resolve(sid, None)?;

        let now = Utc::now();
        let mut draft = Message {
            owner_user_id: user.id,
            event_id: event.id,
            created_at: now,
            updated_at: now,
            ..Message::default()
        };
        draft.apply_changes(changes);

        let message = self.store.insert_message(&draft)?;
        info!("User {} posted message {} on event {}", user.id, message.id, event.id);
        Ok(message)
    }

    pub fn update(&self, sid: &str, id: Uuid, changes: &MessageChanges) -> Result<(Message, bool)> {
        let message = self.find(id)?;
        let user = self.sessions.resolve(sid, None)?;
        authorize(&user, &message)?;

        let (message, changed) = apply_partial_update(message, changes);
        if changed {
            self.store.update_message(&message)?;
        }
        Ok((message, changed))
    }

    pub fn delete(&self, sid: &str, id: Uuid) -> Result<()> {
        let message = self.find(id)?;
        let user = self.sessions.resolve(sid, None)?;
        authorize(&user, &message)?;

        self.store.delete_message(message.id)?;
        Ok(())
    }

    pub fn list_for_event(&self, sid: &str, event_id: Uuid, page: Page) -> Result<Listing<Message>> {
        let event = self
            .store
            .get_event(event_id)?
            .ok_or(CoreError::NotFound("event"))?;
        self.sessions.resolve(sid, None)?;

        let items = self
            .store
            .list_messages(MessageFilter::Event(event.id), page.window())?;
        Ok(Listing { items, page })
    }

    pub fn list_for_current_user(&self, sid: &str, page: Page) -> Result<Listing<Message>> {
        let user = self.sessions.resolve(sid, None)?;
        let items = self
            .store
            .list_messages(MessageFilter::Owner(user.id), page.window())?;
        Ok(Listing { items, page })
    }

    fn find(&self, id: Uuid) -> Result<Message> {
        self.store.get_message(id)?.ok_or(CoreError::NotFound("message"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Gadder;
    use crate::test_support::{sign_in, store};
    use gadder_types::api::EventChanges;

    fn content(text: &str) -> MessageChanges {
        MessageChanges {
            content: Some(text.into()),
            ..MessageChanges::default()
        }
    }

    #[test]
    fn anyone_signed_in_can_post_but_only_author_edits() {
        let core = Gadder::new(store());
        let (alice, alice_sid) = sign_in(&core, "fb-alice");
        let (bob, bob_sid) = sign_in(&core, "fb-bob");
        let event = core
            .events
            .create(&alice_sid, alice.id, &EventChanges::default())
            .unwrap();

        let message = core.messages.create(&bob_sid, event.id, &content("hi")).unwrap();
        assert_eq!(message.owner_user_id, bob.id);
        assert_eq!(message.event_id, event.id);
        assert_eq!(message.created_at, message.updated_at);

        // Even the event owner cannot edit someone else's message.
        assert!(matches!(
            core.messages.update(&alice_sid, message.id, &content("edited")),
            Err(CoreError::Forbidden)
        ));
        assert!(matches!(
            core.messages.delete(&alice_sid, message.id),
            Err(CoreError::Forbidden)
        ));

        let (edited, changed) = core
            .messages
            .update(&bob_sid, message.id, &content("hello"))
            .unwrap();
        assert!(changed);
        assert_eq!(edited.content, "hello");
        assert!(edited.updated_at >= message.updated_at);

        core.messages.delete(&bob_sid, message.id).unwrap();
        assert!(matches!(
            core.messages.update(&bob_sid, message.id, &content("gone")),
            Err(CoreError::NotFound("message"))
        ));
    }

    #[test]
    fn posting_to_missing_event_is_not_found() {
        let core = Gadder::new(store());
        let (_, sid) = sign_in(&core, "fb-alice");

        assert!(matches!(
            core.messages.create(&sid, Uuid::new_v4(), &content("hi")),
            Err(CoreError::NotFound("event"))
        ));
    }

    #[test]
    fn listings_filter_by_event_and_author() {
        let core = Gadder::new(store());
        let (alice, alice_sid) = sign_in(&core, "fb-alice");
        let (_, bob_sid) = sign_in(&core, "fb-bob");
        let first = core
            .events
            .create(&alice_sid, alice.id, &EventChanges::default())
            .unwrap();
        let second = core
            .events
            .create(&alice_sid, alice.id, &EventChanges::default())
            .unwrap();

        core.messages.create(&alice_sid, first.id, &content("a1")).unwrap();
        core.messages.create(&bob_sid, first.id, &content("b1")).unwrap();
        core.messages.create(&bob_sid, second.id, &content("b2")).unwrap();

        let on_first = core
            .messages
            .list_for_event(&alice_sid, first.id, Page::default())
            .unwrap();
        let texts: Vec<_> = on_first.items.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(texts, ["a1", "b1"]);

        let bobs = core
            .messages
            .list_for_current_user(&bob_sid, Page::default())
            .unwrap();
        let texts: Vec<_> = bobs.items.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(texts, ["b1", "b2"]);

        assert!(matches!(
            core.messages.list_for_current_user("", Page::default()),
            Err(CoreError::MissingCredential)
        ));
    }
}
