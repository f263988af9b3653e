//! # Domain Types
//!
//! Core domain types used throughout splitledger.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Participant    │   │    Expense      │   │     Split       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id ("user1")   │   │  description    │   │  participant_id │       │
//! │  │  name           │   │  total (Money)  │   │  amount (Money) │       │
//! │  │  created_at     │   │  paid_by        │   └─────────────────┘       │
//! │  └─────────────────┘   │  participants   │                              │
//! │                        │  policy         │   ┌─────────────────┐       │
//! │  ┌─────────────────┐   │  rounding       │   │  SplitPolicy    │       │
//! │  │   Percentage    │   └─────────────────┘   │  ─────────────  │       │
//! │  │  ─────────────  │                         │  Equal          │       │
//! │  │  bps (u32)      │   ┌─────────────────┐   │  Exact(amounts) │       │
//! │  │  4000 = 40%     │   │   Rounding      │   │  Percentage(..) │       │
//! │  └─────────────────┘   │  Truncate       │   └─────────────────┘       │
//! │                        │  HalfUp         │                              │
//! │                        │  HalfEven       │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Balance snapshots returned by the facades live here too so that hosts can
//! serialize them without touching the ledger internals.

use std::borrow::Borrow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Identifiers
// =============================================================================

/// Stable identifier of a participant, e.g. `"user3"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        ParticipantId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        ParticipantId::new(id)
    }
}

impl Borrow<str> for ParticipantId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Stable identifier of a group, e.g. `"group1"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        GroupId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(id: &str) -> Self {
        GroupId::new(id)
    }
}

impl Borrow<str> for GroupId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Participant
// =============================================================================

/// A registered participant. Created once, never destroyed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,

    /// Display name, trimmed.
    pub name: String,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Percentage
// =============================================================================

/// A percentage in basis points.
///
/// ## Why Basis Points?
/// 1 basis point = 0.01%, which is exactly the ledger tolerance applied to
/// percentage lists. A list is complete when it sums to [`Percentage::FULL_BPS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(u32);

impl Percentage {
    /// 100% in basis points.
    pub const FULL_BPS: u32 = 10_000;

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percentage(bps)
    }

    /// Whole percent, `from_whole(40)` is 40%.
    #[inline]
    pub const fn from_whole(pct: u32) -> Self {
        Percentage(pct * 100)
    }

    /// Creates a percentage from a decimal value (for convenience at input
    /// boundaries). Negative inputs clamp to zero.
    pub fn from_percent(pct: f64) -> Self {
        Percentage((pct * 100.0).round().max(0.0) as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// Rounding
// =============================================================================

/// How a computed share is brought to whole cents.
///
/// Whatever the mode, the split engine restores `Σ shares = total` by
/// handing out the residual cents in participant order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Drop the fractional cent.
    #[default]
    Truncate,
    /// Round half away from zero.
    HalfUp,
    /// Round half to even (bankers rounding).
    HalfEven,
}

impl Rounding {
    /// Rounds `numerator / denominator` to an integer. `denominator` > 0.
    pub(crate) fn apply(self, numerator: i128, denominator: i128) -> i128 {
        let sign = numerator.signum();
        let n = numerator.abs();
        let quotient = n / denominator;
        let remainder = n % denominator;

        let rounded = match self {
            Rounding::Truncate => quotient,
            Rounding::HalfUp => {
                if remainder * 2 >= denominator {
                    quotient + 1
                } else {
                    quotient
                }
            }
            Rounding::HalfEven => {
                let twice = remainder * 2;
                if twice > denominator || (twice == denominator && quotient % 2 == 1) {
                    quotient + 1
                } else {
                    quotient
                }
            }
        };

        sign * rounded
    }
}

impl fmt::Display for Rounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rounding::Truncate => write!(f, "truncate"),
            Rounding::HalfUp => write!(f, "half_up"),
            Rounding::HalfEven => write!(f, "half_even"),
        }
    }
}

impl std::str::FromStr for Rounding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "truncate" | "trunc" | "floor" => Ok(Rounding::Truncate),
            "half_up" => Ok(Rounding::HalfUp),
            "half_even" | "bankers" => Ok(Rounding::HalfEven),
            other => Err(format!(
                "Unknown rounding mode: '{}'. Valid options: truncate, half_up, half_even",
                other
            )),
        }
    }
}

// =============================================================================
// Split Policy
// =============================================================================

/// The rule translating an expense total into per-participant shares.
///
/// Parameters travel with the policy, one value per participant in the
/// same order as the expense's participant list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", content = "values", rename_all = "snake_case")]
pub enum SplitPolicy {
    /// `total / n` each.
    Equal,
    /// Fixed amounts that must add up to the total.
    Exact(Vec<Money>),
    /// Shares of the total that must add up to 100%.
    Percentage(Vec<Percentage>),
}

impl SplitPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            SplitPolicy::Equal => "equal",
            SplitPolicy::Exact(_) => "exact",
            SplitPolicy::Percentage(_) => "percentage",
        }
    }
}

/// One participant's share of an expense. Transient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub participant_id: ParticipantId,
    pub amount: Money,
}

// =============================================================================
// Expense
// =============================================================================

/// A payment by one member to be shared among several.
///
/// Only its effect on the debt matrix outlives [`crate::GroupLedger::add_expense`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub description: String,
    pub total: Money,
    pub paid_by: ParticipantId,
    pub participants: Vec<ParticipantId>,
    pub policy: SplitPolicy,
    #[serde(default)]
    pub rounding: Rounding,
}

impl Expense {
    /// Creates an expense with the default rounding mode.
    pub fn new(
        description: impl Into<String>,
        total: Money,
        paid_by: ParticipantId,
        participants: Vec<ParticipantId>,
        policy: SplitPolicy,
    ) -> Self {
        Expense {
            description: description.into(),
            total,
            paid_by,
            participants,
            policy,
            rounding: Rounding::default(),
        }
    }

    pub fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }
}

// =============================================================================
// Group State
// =============================================================================

/// Lifecycle of a group ledger. `Active` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupState {
    /// No members yet.
    #[default]
    Empty,
    /// At least one member; expenses and settlements are accepted.
    Active,
}

// =============================================================================
// Balance Snapshots
// =============================================================================

/// One signed entry of a member's row.
///
/// Positive: `other` owes the row's member. Negative: the row's member owes
/// `other` the absolute amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub other_id: ParticipantId,
    pub other_name: String,
    pub amount: Money,
}

/// A member's row of the debt matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalances {
    pub member_id: ParticipantId,
    pub member_name: String,
    pub entries: Vec<BalanceEntry>,
}

/// Snapshot of a group's debt matrix, ordered by member join order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupBalances {
    pub group_id: GroupId,
    pub group_name: String,
    pub members: Vec<MemberBalances>,
}

impl GroupBalances {
    /// Signed `bal[member][other]`, zero when absent.
    pub fn amount(&self, member: &str, other: &str) -> Money {
        self.members
            .iter()
            .find(|row| row.member_id.as_str() == member)
            .and_then(|row| row.entries.iter().find(|e| e.other_id.as_str() == other))
            .map(|e| e.amount)
            .unwrap_or_default()
    }

    /// Returns the row for `member`, if it belongs to the group.
    pub fn row(&self, member: &str) -> Option<&MemberBalances> {
        self.members.iter().find(|row| row.member_id.as_str() == member)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_constructors() {
        assert_eq!(Percentage::from_whole(40).bps(), 4000);
        assert_eq!(Percentage::from_percent(33.33).bps(), 3333);
        assert_eq!(Percentage::from_percent(-5.0).bps(), 0);
        assert_eq!(Percentage::from_bps(1250).to_string(), "12.50%");
        assert!((Percentage::from_bps(825).percent() - 8.25).abs() < 0.001);
    }

    #[test]
    fn test_rounding_negative_numerator() {
        assert_eq!(Rounding::Truncate.apply(-7, 2), -3);
        assert_eq!(Rounding::HalfUp.apply(-7, 2), -4);
        assert_eq!(Rounding::HalfEven.apply(-7, 2), -4);
        assert_eq!(Rounding::HalfEven.apply(-5, 2), -2);
    }

    #[test]
    fn test_rounding_parsing() {
        assert_eq!("truncate".parse::<Rounding>().unwrap(), Rounding::Truncate);
        assert_eq!("half-up".parse::<Rounding>().unwrap(), Rounding::HalfUp);
        assert_eq!("Bankers".parse::<Rounding>().unwrap(), Rounding::HalfEven);
        assert!("ceil".parse::<Rounding>().is_err());
        assert_eq!(Rounding::default(), Rounding::Truncate);
    }

    #[test]
    fn test_split_policy_serde_shape() {
        let policy = SplitPolicy::Exact(vec![Money::from_cents(100), Money::from_cents(200)]);
        let json = serde_json::to_string(&policy).unwrap();
        assert_eq!(json, r#"{"policy":"exact","values":[100,200]}"#);

        let json = serde_json::to_string(&SplitPolicy::Equal).unwrap();
        assert_eq!(json, r#"{"policy":"equal"}"#);

        let pct: SplitPolicy =
            serde_json::from_str(r#"{"policy":"percentage","values":[4000,6000]}"#).unwrap();
        assert_eq!(
            pct,
            SplitPolicy::Percentage(vec![Percentage::from_whole(40), Percentage::from_whole(60)])
        );
    }

    #[test]
    fn test_ids_display_and_borrow() {
        let id = ParticipantId::from("user1");
        assert_eq!(id.to_string(), "user1");
        let borrowed: &str = id.borrow();
        assert_eq!(borrowed, "user1");
        assert_eq!(GroupId::new("group2").as_str(), "group2");
    }

    #[test]
    fn test_group_state_default() {
        assert_eq!(GroupState::default(), GroupState::Empty);
    }
}
