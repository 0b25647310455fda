use std::collections::{BTreeSet, HashMap};

use gadder_db::RecordStore;
use gadder_types::models::{EnrichedParticipant, Participant};
use tracing::debug;
use uuid::Uuid;

use crate::{Result, SharedStore};

/// Merges each participant row with its event and user.
#[derive(Clone)]
pub struct EmbeddingComposer {
    store: SharedStore,
}

impl EmbeddingComposer {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// One batched event lookup and one batched user lookup per page. A
    /// reference to a deleted record embeds as a zero-valued placeholder.
    pub fn embed_participants(&self, rows: Vec<Participant>) -> Result<Vec<EnrichedParticipant>> {
        if rows.is_empty() {
            return Ok(vec![]);
        }

        let event_ids: Vec<Uuid> = rows
            .iter()
            .map(|p| p.event_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let user_ids: Vec<Uuid> = rows
            .iter()
            .map(|p| p.user_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let events: HashMap<_, _> = self
            .store
            .get_events(&event_ids)?
            .into_iter()
            .map(|e| (e.id, e))
            .collect();
        let users: HashMap<_, _> = self
            .store
            .get_users(&user_ids)?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let enriched = rows
            .into_iter()
            .map(|participant| {
                let event = events.get(&participant.event_id).cloned().unwrap_or_else(|| {
                    debug!(
                        "Participant {} has dangling event {}",
                        participant.id, participant.event_id
                    );
                    Default::default()
                });
                let user = users.get(&participant.user_id).cloned().unwrap_or_else(|| {
                    debug!(
                        "Participant {} has dangling user {}",
                        participant.id, participant.user_id
                    );
                    Default::default()
                });
                EnrichedParticipant {
                    participant,
                    event,
                    user,
                }
            })
            .collect();

        Ok(enriched)
    }
}
