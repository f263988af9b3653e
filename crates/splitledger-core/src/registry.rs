//! # Identity Registry
//!
//! Issues and resolves stable identifiers for participants and groups.
//!
//! Ids are a fixed prefix followed by a per-kind counter starting at 1:
//! `user1, user2, ...` and `group1, group2, ...`. Counters never go
//! backwards, so an id is never reissued within a registry's lifetime.

use std::collections::HashMap;

use chrono::Utc;
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::types::{GroupId, Participant, ParticipantId};
use crate::validation::validate_name;

/// Prefix of every participant id.
pub const PARTICIPANT_ID_PREFIX: &str = "user";

/// Prefix of every group id.
pub const GROUP_ID_PREFIX: &str = "group";

/// Owns participant records and both id counters.
#[derive(Debug, Default)]
pub struct Registry {
    participants: HashMap<ParticipantId, Participant>,
    next_participant: u64,
    next_group: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a participant and returns its new id.
    ///
    /// Blank names are rejected with [`LedgerError::InvalidName`]; the
    /// counter only advances on success.
    pub fn create_participant(&mut self, name: &str) -> LedgerResult<ParticipantId> {
        let name = validate_name(name).map_err(LedgerError::InvalidName)?;

        self.next_participant += 1;
        let id = ParticipantId::new(format!("{}{}", PARTICIPANT_ID_PREFIX, self.next_participant));

        debug!(participant_id = %id, name = %name, "Participant created");
        self.participants.insert(
            id.clone(),
            Participant {
                id: id.clone(),
                name,
                created_at: Utc::now(),
            },
        );

        Ok(id)
    }

    /// Allocates a group id for `name` and returns it with the trimmed name.
    ///
    /// The group itself is owned by the facade, the registry only hands
    /// out the identifier.
    pub fn create_group(&mut self, name: &str) -> LedgerResult<(GroupId, String)> {
        let name = validate_name(name).map_err(LedgerError::InvalidName)?;

        self.next_group += 1;
        let id = GroupId::new(format!("{}{}", GROUP_ID_PREFIX, self.next_group));

        Ok((id, name))
    }

    /// O(1) lookup. An unknown id is `None`, never a panic.
    pub fn resolve(&self, id: &str) -> Option<&Participant> {
        self.participants.get(id)
    }

    /// Like [`Registry::resolve`] but reports the miss as `ParticipantNotFound`.
    pub fn require(&self, id: &str) -> LedgerResult<&Participant> {
        self.resolve(id)
            .ok_or_else(|| LedgerError::ParticipantNotFound(id.to_string()))
    }

    /// Display name for `id`, or the id itself when unknown.
    pub fn participant_name(&self, id: &ParticipantId) -> String {
        self.resolve(id.as_str())
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Number of registered participants.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
