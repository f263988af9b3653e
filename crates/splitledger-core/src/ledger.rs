//! # Ledger Facade
//!
//! Single entry point routing operations to the registry and the right
//! group ledger.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  caller ──► Ledger::add_expense(group_id, expense)                      │
//! │                 │                                                       │
//! │                 ├── groups[group_id]  ──missing──► GroupNotFound        │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │            GroupLedger::add_expense                                     │
//! │                 ├── membership closure ──────────► NotMember           │
//! │                 ├── split::compute_splits ───────► InvalidSplit         │
//! │                 └── matrix update                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Ledger` is a plain value: every test builds its own. For a shared,
//! thread-safe instance see [`crate::state::SharedLedger`].

use std::collections::HashMap;

use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::group::GroupLedger;
use crate::money::Money;
use crate::registry::Registry;
use crate::types::{Expense, GroupBalances, GroupId, Participant, ParticipantId, Split};

/// Owns the registry and every group ledger.
#[derive(Debug, Default)]
pub struct Ledger {
    registry: Registry,
    groups: HashMap<GroupId, GroupLedger>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_participant(&mut self, name: &str) -> LedgerResult<ParticipantId> {
        self.registry.create_participant(name)
    }

    /// Resolves a participant id; `None` when unknown.
    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.registry.resolve(id)
    }

    pub fn create_group(&mut self, name: &str) -> LedgerResult<GroupId> {
        let (id, name) = self.registry.create_group(name)?;
        info!(group_id = %id, name = %name, "Group created");
        self.groups.insert(id.clone(), GroupLedger::new(id.clone(), name));
        Ok(id)
    }

    pub fn group(&self, id: &str) -> Option<&GroupLedger> {
        self.groups.get(id)
    }

    /// Adds a registered participant to a group. Idempotent.
    pub fn add_member_to_group(&mut self, group_id: &GroupId, participant_id: &ParticipantId) -> LedgerResult<()> {
        self.registry.require(participant_id.as_str())?;
        self.group_mut(group_id)?.add_member(participant_id.clone());
        Ok(())
    }

    /// Applies an expense to a group and returns the computed splits.
    pub fn add_expense(&mut self, group_id: &GroupId, expense: &Expense) -> LedgerResult<Vec<Split>> {
        self.group_mut(group_id)?.add_expense(expense)
    }

    /// Records a payment from `from` to `to` inside a group.
    pub fn settle(
        &mut self,
        group_id: &GroupId,
        from: &ParticipantId,
        to: &ParticipantId,
        amount: Money,
    ) -> LedgerResult<()> {
        self.group_mut(group_id)?.settle(from, to, amount)
    }

    /// Snapshot of a group's balances with display names resolved.
    pub fn show_group_balances(&self, group_id: &GroupId) -> LedgerResult<GroupBalances> {
        let group = self.require_group(group_id)?;
        Ok(group.snapshot(|id| self.registry.participant_name(id)))
    }

    /// Signed `bal[a][b]` inside a group.
    pub fn balance(&self, group_id: &GroupId, a: &ParticipantId, b: &ParticipantId) -> LedgerResult<Money> {
        Ok(self.require_group(group_id)?.balance(a.as_str(), b.as_str()))
    }

    /// Group ids in creation order.
    pub fn group_ids(&self) -> Vec<GroupId> {
        let mut ids: Vec<GroupId> = self.groups.keys().cloned().collect();
        ids.sort_by_key(|id| creation_index(id));
        ids
    }

    fn require_group(&self, id: &GroupId) -> LedgerResult<&GroupLedger> {
        self.groups
            .get(id)
            .ok_or_else(|| LedgerError::GroupNotFound(id.to_string()))
    }

    fn group_mut(&mut self, id: &GroupId) -> LedgerResult<&mut GroupLedger> {
        self.groups
            .get_mut(id)
            .ok_or_else(|| LedgerError::GroupNotFound(id.to_string()))
    }
}

/// Numeric suffix of a registry-issued id, used to order by creation.
pub(crate) fn creation_index(id: &GroupId) -> u64 {
    id.as_str()
        .trim_start_matches(crate::registry::GROUP_ID_PREFIX)
        .parse()
        .unwrap_or(u64::MAX)
}
