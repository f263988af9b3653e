//! # Shared Ledger State
//!
//! Thread-safe facade for hosts that call into the ledger concurrently.
//!
//! ## Locking Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SharedLedger                                     │
//! │                                                                         │
//! │  registry: Mutex<Registry>          ◄── id allocation, name lookup      │
//! │                                                                         │
//! │  groups:   RwLock<HashMap<GroupId, Arc<Mutex<GroupLedger>>>>            │
//! │              │                                                          │
//! │              ├── group1 ──► Mutex ◄── add_member / expense / settle     │
//! │              ├── group2 ──► Mutex      serialized per group             │
//! │              └── ...                   groups run in parallel           │
//! │                                                                         │
//! │  NOTE: No operation holds two locks at once. The group map lock is     │
//! │        released as soon as the group's Arc is cloned.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, RwLock};

use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::group::GroupLedger;
use crate::ledger::creation_index;
use crate::money::Money;
use crate::registry::Registry;
use crate::types::{Expense, GroupBalances, GroupId, Participant, ParticipantId, Split};

static GLOBAL: OnceLock<SharedLedger> = OnceLock::new();

/// Ledger facade safe to share between threads (`Arc<SharedLedger>` or
/// [`SharedLedger::global`]).
#[derive(Debug, Default)]
pub struct SharedLedger {
    registry: Mutex<Registry>,
    groups: RwLock<HashMap<GroupId, Arc<Mutex<GroupLedger>>>>,
}

impl SharedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide instance, created on first use.
    ///
    /// Convenience only: tests and embedders should prefer owning a
    /// [`SharedLedger`] or [`crate::Ledger`] value.
    pub fn global() -> &'static SharedLedger {
        GLOBAL.get_or_init(SharedLedger::new)
    }

    pub fn create_participant(&self, name: &str) -> LedgerResult<ParticipantId> {
        self.with_registry_mut(|registry| registry.create_participant(name))
    }

    /// Returns a copy of the participant record.
    pub fn participant(&self, id: &str) -> Option<Participant> {
        self.with_registry(|registry| registry.resolve(id).cloned())
    }

    pub fn create_group(&self, name: &str) -> LedgerResult<GroupId> {
        let (id, name) = self.with_registry_mut(|registry| registry.create_group(name))?;
        info!(group_id = %id, name = %name, "Group created");

        let ledger = GroupLedger::new(id.clone(), name);
        self.groups
            .write()
            .expect("Group map lock poisoned")
            .insert(id.clone(), Arc::new(Mutex::new(ledger)));
        Ok(id)
    }

    pub fn add_member_to_group(&self, group_id: &GroupId, participant_id: &ParticipantId) -> LedgerResult<()> {
        self.with_registry(|registry| registry.require(participant_id.as_str()).map(|_| ()))?;
        self.with_group_mut(group_id, |group| {
            group.add_member(participant_id.clone());
            Ok(())
        })
    }

    pub fn add_expense(&self, group_id: &GroupId, expense: &Expense) -> LedgerResult<Vec<Split>> {
        self.with_group_mut(group_id, |group| group.add_expense(expense))
    }

    pub fn settle(
        &self,
        group_id: &GroupId,
        from: &ParticipantId,
        to: &ParticipantId,
        amount: Money,
    ) -> LedgerResult<()> {
        self.with_group_mut(group_id, |group| group.settle(from, to, amount))
    }

    /// Snapshot of a group's balances with display names resolved.
    ///
    /// The matrix is copied under the group lock; names are filled in
    /// afterwards under the registry lock.
    pub fn show_group_balances(&self, group_id: &GroupId) -> LedgerResult<GroupBalances> {
        let raw = self.with_group_mut(group_id, |group| Ok(group.snapshot(|id| id.to_string())))?;

        Ok(self.with_registry(|registry| {
            let mut named = raw;
            for row in &mut named.members {
                row.member_name = registry.participant_name(&row.member_id);
                for entry in &mut row.entries {
                    entry.other_name = registry.participant_name(&entry.other_id);
                }
            }
            named
        }))
    }

    pub fn balance(&self, group_id: &GroupId, a: &ParticipantId, b: &ParticipantId) -> LedgerResult<Money> {
        self.with_group_mut(group_id, |group| Ok(group.balance(a.as_str(), b.as_str())))
    }

    /// Group ids in creation order.
    pub fn group_ids(&self) -> Vec<GroupId> {
        let mut ids: Vec<GroupId> = self
            .groups
            .read()
            .expect("Group map lock poisoned")
            .keys()
            .cloned()
            .collect();
        ids.sort_by_key(creation_index);
        ids
    }

    // =========================================================================
    // Lock helpers
    // =========================================================================

    fn with_registry<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Registry) -> R,
    {
        let registry = self.registry.lock().expect("Registry mutex poisoned");
        f(&registry)
    }

    fn with_registry_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Registry) -> R,
    {
        let mut registry = self.registry.lock().expect("Registry mutex poisoned");
        f(&mut registry)
    }

    /// Runs `f` with exclusive access to one group.
    fn with_group_mut<F, R>(&self, group_id: &GroupId, f: F) -> LedgerResult<R>
    where
        F: FnOnce(&mut GroupLedger) -> LedgerResult<R>,
    {
        let group = self
            .groups
            .read()
            .expect("Group map lock poisoned")
            .get(group_id)
            .cloned()
            .ok_or_else(|| LedgerError::GroupNotFound(group_id.to_string()))?;

        let mut guard = group.lock().expect("Group mutex poisoned");
        f(&mut guard)
    }
}
