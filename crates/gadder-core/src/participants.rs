use chrono::Utc;
use gadder_db::{ParticipantFilter, RecordStore};
use gadder_types::api::ParticipantChanges;
use gadder_types::models::{
    DEFAULT_REQUEST_STATUS, DEFAULT_RESPONSE_STATUS, EnrichedParticipant, Participant,
};
use tracing::info;
use uuid::Uuid;

use crate::authz::{AuthorizationGate, authorize};
use crate::embed::EmbeddingComposer;
use crate::mutate::{PartialUpdate, apply_partial_update};
use crate::session::SessionResolver;
use crate::{CoreError, Listing, Page, Result, SharedStore};

#[derive(Clone)]
pub struct ParticipantService {
    store: SharedStore,
    sessions: SessionResolver,
    gate: AuthorizationGate,
    composer: EmbeddingComposer,
}

impl ParticipantService {
    pub fn new(store: SharedStore) -> Self {
        Self {
            sessions: SessionResolver::new(store.clone()),
            gate: AuthorizationGate::new(store.clone()),
            composer: EmbeddingComposer::new(store.clone()),
            store,
        }
    }

    /// Adds a participant to an event.
    ///
    /// Without `invitee`, or with the session user's own id, this is a
    /// request to join. Naming anyone else is an invitation and requires the
    /// session user to own the event.
    pub fn create(
        &self,
        sid: &str,
        event_id: Uuid,
        invitee: Option<Uuid>,
        changes: &ParticipantChanges,
    ) -> Result<Participant> {
        let event = self
            .store
            .get_event(event_id)?
            .ok_or(CoreError::NotFound("event"))?;
        let actor = self.sessions.resolve(sid, None)?;

        let user_id = match invitee {
            Some(id) if id != actor.id => {
                authorize(&actor, &event)?;
                self.store
                    .get_user(id)?
                    .ok_or(CoreError::NotFound("user"))?
                    .id
            }
            _ => actor.id,
        };

        let now = Utc::now();
        let mut draft = Participant {
            event_id: event.id,
            user_id,
            request_status: DEFAULT_REQUEST_STATUS.to_string(),
            response_status: DEFAULT_RESPONSE_STATUS.to_string(),
            created_at: now,
            updated_at: now,
            ..Participant::default()
        };
        draft.apply_changes(changes);

        let participant = self.store.insert_participant(&draft)?;
        info!(
            "User {} added participant {} (user {}) to event {}",
            actor.id, participant.id, user_id, event.id
        );
        Ok(participant)
    }

    pub fn update(
        &self,
        sid: &str,
        id: Uuid,
        changes: &ParticipantChanges,
    ) -> Result<(Participant, bool)> {
        let participant = self.find(id)?;
        let actor = self.sessions.resolve(sid, None)?;
        self.gate.authorize_participant(&actor, &participant)?;

        let (participant, changed) = apply_partial_update(participant, changes);
        if changed {
            self.store.update_participant(&participant)?;
        }
        Ok((participant, changed))
    }

    pub fn delete(&self, sid: &str, id: Uuid) -> Result<()> {
        let participant = self.find(id)?;
        let actor = self.sessions.resolve(sid, None)?;
        self.gate.authorize_participant(&actor, &participant)?;

        self.store.delete_participant(participant.id)?;
        info!("User {} removed participant {}", actor.id, participant.id);
        Ok(())
    }

    pub fn show(&self, id: Uuid) -> Result<EnrichedParticipant> {
        let participant = self.find(id)?;
        self.composer
            .embed_participants(vec![participant])?
            .pop()
            .ok_or(CoreError::NotFound("participant"))
    }

    pub fn list_for_event(
        &self,
        sid: &str,
        event_id: Uuid,
        page: Page,
    ) -> Result<Listing<EnrichedParticipant>> {
        let event = self
            .store
            .get_event(event_id)?
            .ok_or(CoreError::NotFound("event"))?;
        self.sessions.resolve(sid, None)?;

        let rows = self
            .store
            .list_participants(ParticipantFilter::Event(event.id), page.window())?;
        let items = self.composer.embed_participants(rows)?;
        Ok(Listing { items, page })
    }

    pub fn list_for_current_user(
        &self,
        sid: &str,
        page: Page,
    ) -> Result<Listing<EnrichedParticipant>> {
        let actor = self.sessions.resolve(sid, None)?;
        let rows = self
            .store
            .list_participants(ParticipantFilter::User(actor.id), page.window())?;
        let items = self.composer.embed_participants(rows)?;
        Ok(Listing { items, page })
    }

    fn find(&self, id: Uuid) -> Result<Participant> {
        self.store
            .get_participant(id)?
            .ok_or(CoreError::NotFound("participant"))
    }
}
