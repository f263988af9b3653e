//! # Group Ledger
//!
//! One group's members and its signed pairwise debt matrix.
//!
//! ## Matrix Convention
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  bal[A][B] = amount A has advanced on B's behalf                        │
//! │                                                                         │
//! │    bal[A][B] > 0   →  B owes A                                          │
//! │    bal[A][B] < 0   →  A owes B |bal[A][B]|                              │
//! │    bal[A][B] = 0   →  entry absent                                      │
//! │                                                                         │
//! │  Every mutation writes both halves:                                     │
//! │    bal[A][B] += x ; bal[B][A] -= x                                      │
//! │                                                                         │
//! │  so bal[A][B] = -bal[B][A] and the matrix always sums to zero.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The matrix is never simplified: each pair keeps its own history, and a
//! group of n members stores at most n(n-1)/2 nonzero pairs.
//!
//! Operations validate everything before writing, so a rejected expense or
//! settlement leaves the matrix exactly as it was.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::money::Money;
use crate::split::compute_splits;
use crate::types::{
    BalanceEntry, Expense, GroupBalances, GroupId, GroupState, MemberBalances, ParticipantId,
    Split,
};
use crate::validation::validate_positive_amount;

/// Raw matrix row: a member and its nonzero `(other, bal[member][other])` pairs.
pub type BalanceRow = (ParticipantId, Vec<(ParticipantId, Money)>);

/// The debt ledger of a single group.
#[derive(Debug, Clone)]
pub struct GroupLedger {
    id: GroupId,
    name: String,
    /// Join order; drives the order of every listing.
    members: Vec<ParticipantId>,
    balances: HashMap<ParticipantId, HashMap<ParticipantId, Money>>,
}

impl GroupLedger {
    pub fn new(id: GroupId, name: impl Into<String>) -> Self {
        GroupLedger {
            id,
            name: name.into(),
            members: Vec::new(),
            balances: HashMap::new(),
        }
    }

    pub fn id(&self) -> &GroupId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Members in join order.
    pub fn members(&self) -> &[ParticipantId] {
        &self.members
    }

    pub fn state(&self) -> GroupState {
        if self.members.is_empty() {
            GroupState::Empty
        } else {
            GroupState::Active
        }
    }

    pub fn is_member(&self, id: &str) -> bool {
        self.balances.contains_key(id)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a member with an empty row.
    ///
    /// Idempotent: returns `false` and changes nothing when `id` is already
    /// a member.
    pub fn add_member(&mut self, id: ParticipantId) -> bool {
        if self.is_member(id.as_str()) {
            return false;
        }

        debug!(group_id = %self.id, participant_id = %id, "Member added");
        self.balances.insert(id.clone(), HashMap::new());
        self.members.push(id);
        true
    }

    /// Applies an expense and returns the computed splits.
    ///
    /// ## Flow
    /// ```text
    /// payer ∈ members? ──no──► NotMember
    ///      │
    /// participants ⊆ members? ──no──► NotMember
    ///      │
    /// compute_splits ──err──► InvalidAmount / InvalidSplit
    ///      │
    /// for each split s with s.participant ≠ payer:
    ///     bal[payer][s.participant] += s.amount
    ///     bal[s.participant][payer] -= s.amount
    /// ```
    ///
    /// The payer's own share affects no pairwise balance. A payer who is the
    /// only participant is accepted as a no-op.
    pub fn add_expense(&mut self, expense: &Expense) -> LedgerResult<Vec<Split>> {
        self.require_member(&expense.paid_by)?;
        for participant in &expense.participants {
            self.require_member(participant)?;
        }

        let splits = compute_splits(
            expense.total,
            &expense.participants,
            &expense.policy,
            expense.rounding,
        )?;

        if splits.iter().all(|s| s.participant_id == expense.paid_by) {
            warn!(
                group_id = %self.id,
                description = %expense.description,
                payer = %expense.paid_by,
                "Expense has no participant other than the payer, balances unchanged"
            );
            return Ok(splits);
        }

        let debts: Vec<(&ParticipantId, Money)> = splits
            .iter()
            .filter(|s| s.participant_id != expense.paid_by)
            .map(|s| (&s.participant_id, s.amount))
            .collect();
        self.transfer(&expense.paid_by, &debts)?;

        debug!(
            group_id = %self.id,
            description = %expense.description,
            total = %expense.total,
            payer = %expense.paid_by,
            policy = expense.policy.name(),
            participants = expense.participants.len(),
            "Expense applied"
        );

        Ok(splits)
    }

    /// Records a direct payment from `from` to `to`.
    ///
    /// Applies `bal[from][to] += amount` and the mirrored negative, which
    /// cancels an existing debt of `from` towards `to`.
    pub fn settle(&mut self, from: &ParticipantId, to: &ParticipantId, amount: Money) -> LedgerResult<()> {
        validate_positive_amount("settlement amount", amount).map_err(LedgerError::InvalidAmount)?;
        self.require_member(from)?;
        self.require_member(to)?;

        if from == to {
            return Err(LedgerError::SelfSettlement {
                participant_id: from.to_string(),
            });
        }

        self.transfer(from, &[(to, amount)])?;

        debug!(group_id = %self.id, from = %from, to = %to, amount = %amount, "Settlement applied");
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Signed `bal[a][b]`; zero when the pair has no entry.
    pub fn balance(&self, a: &str, b: &str) -> Money {
        self.balances
            .get(a)
            .and_then(|row| row.get(b))
            .copied()
            .unwrap_or_default()
    }

    /// Sum of a member's row: positive when the group owes them overall.
    ///
    /// `None` when the row total does not fit in a [`Money`].
    pub fn net_balance(&self, member: &str) -> Option<Money> {
        match self.balances.get(member) {
            Some(row) => Money::checked_sum(row.values()),
            None => Some(Money::zero()),
        }
    }

    /// The matrix grouped by member, in join order, zero entries omitted.
    ///
    /// Every member has a row, possibly empty. The result is an owned
    /// snapshot.
    pub fn list_balances(&self) -> Vec<BalanceRow> {
        self.members
            .iter()
            .map(|member| {
                let entries = self
                    .members
                    .iter()
                    .map(|other| (other.clone(), self.balance(member.as_str(), other.as_str())))
                    .filter(|(_, amount)| !amount.is_zero())
                    .collect();
                (member.clone(), entries)
            })
            .collect()
    }

    /// Builds a [`GroupBalances`] snapshot, resolving display names with `name_of`.
    pub fn snapshot<F>(&self, name_of: F) -> GroupBalances
    where
        F: Fn(&ParticipantId) -> String,
    {
        let members = self
            .list_balances()
            .into_iter()
            .map(|(member_id, entries)| MemberBalances {
                member_name: name_of(&member_id),
                member_id,
                entries: entries
                    .into_iter()
                    .map(|(other_id, amount)| BalanceEntry {
                        other_name: name_of(&other_id),
                        other_id,
                        amount,
                    })
                    .collect(),
            })
            .collect();

        GroupBalances {
            group_id: self.id.clone(),
            group_name: self.name.clone(),
            members,
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn require_member(&self, id: &ParticipantId) -> LedgerResult<()> {
        if self.is_member(id.as_str()) {
            Ok(())
        } else {
            Err(LedgerError::NotMember {
                group_id: self.id.to_string(),
                participant_id: id.to_string(),
            })
        }
    }

    /// `bal[creditor][debtor] += amount` and the mirrored negative, for
    /// every `(debtor, amount)` pair.
    ///
    /// All new cells are computed first; nothing is written if any of them
    /// would overflow.
    fn transfer(&mut self, creditor: &ParticipantId, debts: &[(&ParticipantId, Money)]) -> LedgerResult<()> {
        let mut cells = Vec::with_capacity(debts.len() * 2);

        for &(debtor, amount) in debts {
            let overflow = || LedgerError::BalanceOverflow {
                group_id: self.id.to_string(),
                creditor: creditor.to_string(),
                debtor: debtor.to_string(),
            };

            let forward = self
                .balance(creditor.as_str(), debtor.as_str())
                .checked_add(amount)
                .ok_or_else(overflow)?;
            let backward = self
                .balance(debtor.as_str(), creditor.as_str())
                .checked_sub(amount)
                .ok_or_else(overflow)?;

            cells.push((creditor, debtor, forward));
            cells.push((debtor, creditor, backward));
        }

        for (row, column, value) in cells {
            self.set(row, column, value);
        }
        Ok(())
    }

    fn set(&mut self, row: &ParticipantId, column: &ParticipantId, value: Money) {
        // Rows exist for every member; callers check membership first
        let Some(entries) = self.balances.get_mut(row) else {
            return;
        };

        if value.is_zero() {
            entries.remove(column);
        } else {
            entries.insert(column.clone(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::{Percentage, SplitPolicy};

    fn id(raw: &str) -> ParticipantId {
        ParticipantId::from(raw)
    }

    fn group_with(members: &[&str]) -> GroupLedger {
        let mut group = GroupLedger::new(GroupId::from("group1"), "Hostel");
        for m in members {
            group.add_member(id(m));
        }
        group
    }

    fn assert_antisymmetric(group: &GroupLedger) {
        for a in group.members() {
            for b in group.members() {
                assert_eq!(
                    group.balance(a.as_str(), b.as_str()),
                    -group.balance(b.as_str(), a.as_str()),
                    "bal[{a}][{b}] not mirrored"
                );
            }
            assert!(group.balance(a.as_str(), a.as_str()).is_zero());
        }
    }

    #[test]
    fn test_state_machine() {
        let mut group = GroupLedger::new(GroupId::from("group1"), "Hostel");
        assert_eq!(group.state(), GroupState::Empty);

        assert!(group.add_member(id("user1")));
        assert_eq!(group.state(), GroupState::Active);
    }

    #[test]
    fn test_add_member_idempotent() {
        let mut group = group_with(&["user1", "user2"]);
        group
            .settle(&id("user1"), &id("user2"), Money::from_major(5))
            .unwrap();
        let before = group.list_balances();

        assert!(!group.add_member(id("user1")));
        assert_eq!(group.members().len(), 2);
        assert_eq!(group.list_balances(), before);
    }

    #[test]
    fn test_equal_expense_updates_pairs() {
        let mut group = group_with(&["user1", "user2", "user3", "user4"]);
        let expense = Expense::new(
            "Lunch",
            Money::from_major(800),
            id("user1"),
            group.members().to_vec(),
            SplitPolicy::Equal,
        );

        let splits = group.add_expense(&expense).unwrap();
        assert_eq!(splits.len(), 4);

        for other in ["user2", "user3", "user4"] {
            assert_eq!(group.balance("user1", other), Money::from_major(200));
            assert_eq!(group.balance(other, "user1"), Money::from_major(-200));
        }
        assert_eq!(group.net_balance("user1"), Some(Money::from_major(600)));
        assert_antisymmetric(&group);
    }

    #[test]
    fn test_payer_outside_participant_list() {
        let mut group = group_with(&["a", "b", "c"]);
        let expense = Expense::new(
            "Taxi",
            Money::from_major(90),
            id("a"),
            vec![id("b"), id("c")],
            SplitPolicy::Equal,
        );

        group.add_expense(&expense).unwrap();
        assert_eq!(group.balance("a", "b"), Money::from_major(45));
        assert_eq!(group.balance("a", "c"), Money::from_major(45));
        assert_antisymmetric(&group);
    }

    #[test]
    fn test_payer_only_expense_is_noop() {
        let mut group = group_with(&["a", "b"]);
        let expense = Expense::new(
            "Snack",
            Money::from_major(10),
            id("a"),
            vec![id("a")],
            SplitPolicy::Equal,
        );

        let splits = group.add_expense(&expense).unwrap();
        assert_eq!(splits[0].amount, Money::from_major(10));
        assert!(group.list_balances().iter().all(|(_, entries)| entries.is_empty()));
    }

    #[test]
    fn test_rejections_leave_matrix_untouched() {
        let mut group = group_with(&["a", "b"]);
        group
            .add_expense(&Expense::new(
                "Trip",
                Money::from_major(1000),
                id("a"),
                vec![id("a"), id("b")],
                SplitPolicy::Percentage(vec![Percentage::from_whole(40), Percentage::from_whole(60)]),
            ))
            .unwrap();
        let before = group.list_balances();

        let bad_exact = Expense::new(
            "Bad",
            Money::from_major(100),
            id("a"),
            vec![id("a"), id("b")],
            SplitPolicy::Exact(vec![Money::from_major(40), Money::from_major(50)]),
        );
        assert_eq!(group.add_expense(&bad_exact).unwrap_err().kind(), ErrorKind::InvalidSplit);

        let ghost = Expense::new(
            "Ghost",
            Money::from_major(100),
            id("uX"),
            vec![id("a")],
            SplitPolicy::Equal,
        );
        assert_eq!(group.add_expense(&ghost).unwrap_err().kind(), ErrorKind::NotMember);

        let stranger = Expense::new(
            "Stranger",
            Money::from_major(100),
            id("a"),
            vec![id("b"), id("zed")],
            SplitPolicy::Equal,
        );
        assert_eq!(group.add_expense(&stranger).unwrap_err().kind(), ErrorKind::NotMember);

        let duplicate = Expense::new(
            "Twice",
            Money::from_major(100),
            id("a"),
            vec![id("b"), id("b")],
            SplitPolicy::Equal,
        );
        assert_eq!(group.add_expense(&duplicate).unwrap_err().kind(), ErrorKind::InvalidSplit);

        assert_eq!(group.list_balances(), before);
        assert_eq!(group.balance("a", "b"), Money::from_major(600));
    }

    #[test]
    fn test_settle() {
        let mut group = group_with(&["a", "b"]);
        group
            .add_expense(&Expense::new(
                "Dinner",
                Money::from_major(50),
                id("b"),
                vec![id("a")],
                SplitPolicy::Exact(vec![Money::from_major(50)]),
            ))
            .unwrap();
        assert_eq!(group.balance("a", "b"), Money::from_major(-50));

        group.settle(&id("a"), &id("b"), Money::from_major(50)).unwrap();
        assert!(group.balance("a", "b").is_zero());
        assert!(group.list_balances().iter().all(|(_, e)| e.is_empty()));
    }

    #[test]
    fn test_settle_rejections() {
        let mut group = group_with(&["a", "b"]);

        let err = group.settle(&id("a"), &id("b"), Money::zero()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);

        let err = group.settle(&id("a"), &id("b"), Money::from_cents(-1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);

        let err = group.settle(&id("a"), &id("a"), Money::from_major(1)).unwrap_err();
        assert!(matches!(err, LedgerError::SelfSettlement { .. }));

        let err = group.settle(&id("a"), &id("c"), Money::from_major(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotMember);

        assert!(group.list_balances().iter().all(|(_, e)| e.is_empty()));
    }

    #[test]
    fn test_overflowing_expense_is_rejected() {
        let mut group = group_with(&["a", "b"]);
        let half = Money::from_cents(i64::MAX / 2 + 1);
        let loan = Expense::new("Loan", half, id("a"), vec![id("b")], SplitPolicy::Exact(vec![half]));

        group.add_expense(&loan).unwrap();
        let err = group.add_expense(&loan).unwrap_err();
        assert!(matches!(err, LedgerError::BalanceOverflow { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);
        assert_eq!(group.balance("a", "b"), half);
        assert_eq!(group.balance("b", "a"), -half);
    }

    #[test]
    fn test_overflow_on_one_pair_writes_nothing() {
        let mut group = group_with(&["a", "b", "c"]);
        let huge = Money::from_cents(i64::MAX - 10);
        group
            .add_expense(&Expense::new("Car", huge, id("a"), vec![id("c")], SplitPolicy::Exact(vec![huge])))
            .unwrap();
        let before = group.list_balances();

        // b's share fits, c's share overflows bal[a][c]
        let fuel = Expense::new(
            "Fuel",
            Money::from_major(1),
            id("a"),
            vec![id("b"), id("c")],
            SplitPolicy::Equal,
        );
        assert_eq!(group.add_expense(&fuel).unwrap_err().kind(), ErrorKind::InvalidAmount);
        assert_eq!(group.list_balances(), before);
        assert!(group.balance("a", "b").is_zero());

        let err = group.settle(&id("a"), &id("c"), Money::from_cents(11)).unwrap_err();
        assert!(matches!(err, LedgerError::BalanceOverflow { .. }));
        assert_eq!(group.list_balances(), before);

        // Paying the debt down still works
        group.settle(&id("c"), &id("a"), Money::from_cents(10)).unwrap();
        assert_eq!(group.balance("a", "c"), huge - Money::from_cents(10));
        assert_eq!(group.net_balance("a"), Some(huge - Money::from_cents(10)));
    }

    #[test]
    fn test_list_balances_follows_join_order() {
        let mut group = group_with(&["user10", "user2", "user1"]);
        group
            .add_expense(&Expense::new(
                "Groceries",
                Money::from_major(30),
                id("user1"),
                vec![id("user10"), id("user2"), id("user1")],
                SplitPolicy::Equal,
            ))
            .unwrap();

        let rows = group.list_balances();
        let order: Vec<&str> = rows.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(order, vec!["user10", "user2", "user1"]);

        let (_, payer_row) = &rows[2];
        let others: Vec<&str> = payer_row.iter().map(|(o, _)| o.as_str()).collect();
        assert_eq!(others, vec!["user10", "user2"]);
    }

    #[test]
    fn test_snapshot_resolves_names() {
        let mut group = group_with(&["a", "b"]);
        group.settle(&id("a"), &id("b"), Money::from_major(20)).unwrap();

        let snapshot = group.snapshot(|p| p.as_str().to_uppercase());
        assert_eq!(snapshot.group_name, "Hostel");
        assert_eq!(snapshot.members[0].member_name, "A");
        assert_eq!(snapshot.members[0].entries[0].other_name, "B");
        assert_eq!(snapshot.amount("b", "a"), Money::from_major(-20));
    }
}
