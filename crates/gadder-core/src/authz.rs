use gadder_db::RecordStore;
use gadder_types::models::{Event, Message, Participant, User};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{CoreError, Result, SharedStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn into_result(self) -> Result<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(CoreError::Forbidden),
        }
    }
}

/// Anything carrying ownership references. Any listed owner may mutate it.
pub trait Owned {
    fn owner_ids(&self) -> Vec<Uuid>;
}

impl Owned for Event {
    fn owner_ids(&self) -> Vec<Uuid> {
        vec![self.owner_user_id]
    }
}

impl Owned for Message {
    fn owner_ids(&self) -> Vec<Uuid> {
        vec![self.owner_user_id]
    }
}

/// A participant row seen together with its parent event: the participant's
/// own user and the event owner may both act on it.
pub struct ParticipantScope<'a> {
    pub participant: &'a Participant,
    pub event: Option<&'a Event>,
}

impl Owned for ParticipantScope<'_> {
    fn owner_ids(&self) -> Vec<Uuid> {
        let mut owners = vec![self.participant.user_id];
        if let Some(event) = self.event {
            owners.push(event.owner_user_id);
        }
        owners
    }
}

pub fn decide(actor: Uuid, owners: &[Uuid]) -> Decision {
    if owners.contains(&actor) {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

pub fn authorize(actor: &User, resource: &impl Owned) -> Result<()> {
    let decision = decide(actor.id, &resource.owner_ids());
    if decision == Decision::Deny {
        debug!("Denied mutation by user {}", actor.id);
    }
    decision.into_result()
}

/// Authorization that needs extra lookups before it can decide.
#[derive(Clone)]
pub struct AuthorizationGate {
    store: SharedStore,
}

impl AuthorizationGate {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Loads the participant's event and applies the widened participant
    /// rule. If the event is gone only the participant's own user remains an
    /// owner.
    pub fn authorize_participant(&self, actor: &User, participant: &Participant) -> Result<()> {
        let event = self.store.get_event(participant.event_id)?;
        if event.is_none() {
            warn!(
                "Participant {} references missing event {}",
                participant.id, participant.event_id
            );
        }

        authorize(
            actor,
            &ParticipantScope {
                participant,
                event: event.as_ref(),
            },
        )
    }
}
