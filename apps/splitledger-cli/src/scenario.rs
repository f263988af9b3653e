//! # Scenario Files
//!
//! A scenario is a TOML document that names participants, creates groups
//! and replays events against a fresh [`Ledger`].
//!
//! ```toml
//! rounding = "half_even"              # optional, overrides [split] config
//! participants = ["Aditya", "Rohit"]
//!
//! [[groups]]
//! name = "Hostel"
//! members = ["Aditya", "Rohit"]
//!
//! [[groups.events]]
//! kind = "expense"
//! description = "Lunch"
//! amount = 400.0
//! paid_by = "Aditya"
//! split = "equal"                     # equal | exact | percentage
//! participants = ["Aditya", "Rohit"]
//!
//! [[groups.events]]
//! kind = "settle"
//! from = "Rohit"
//! to = "Aditya"
//! amount = 200.0
//!
//! [[groups.events]]
//! kind = "show"
//! ```
//!
//! Participants are referenced by display name inside a scenario, so names
//! must be unique within one file.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use splitledger_core::{
    Expense, GroupBalances, GroupId, Ledger, Money, ParticipantId, Percentage, Rounding,
    SplitPolicy,
};
use tracing::{debug, info};

use crate::error::{CliError, CliResult};

/// The hostel walkthrough printed by `splitledger demo`.
pub const DEMO_SCENARIO: &str = r#"
participants = ["Aditya", "Rohit", "Manish", "Saurav"]

[[groups]]
name = "Hostel"
members = ["Aditya", "Rohit", "Manish", "Saurav"]

[[groups.events]]
kind = "expense"
description = "Lunch"
amount = 800.0
paid_by = "Aditya"
split = "equal"
participants = ["Aditya", "Rohit", "Manish", "Saurav"]

[[groups.events]]
kind = "expense"
description = "Dinner"
amount = 700.0
paid_by = "Manish"
split = "exact"
participants = ["Aditya", "Manish", "Saurav"]
values = [200.0, 300.0, 200.0]

[[groups.events]]
kind = "show"

[[groups.events]]
kind = "settle"
from = "Rohit"
to = "Manish"
amount = 200.0
"#;

// =============================================================================
// Scenario Model
// =============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Scenario {
    /// Default rounding for every expense in the file.
    #[serde(default)]
    pub rounding: Option<Rounding>,

    pub participants: Vec<String>,

    #[serde(default)]
    pub groups: Vec<GroupSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GroupSpec {
    pub name: String,

    #[serde(default)]
    pub members: Vec<String>,

    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitKind {
    #[default]
    Equal,
    Exact,
    Percentage,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioEvent {
    Expense {
        description: String,
        amount: f64,
        paid_by: String,
        #[serde(default)]
        split: SplitKind,
        participants: Vec<String>,
        /// Amounts for `exact`, percents for `percentage`, unused for `equal`.
        #[serde(default)]
        values: Vec<f64>,
        #[serde(default)]
        rounding: Option<Rounding>,
    },
    Settle {
        from: String,
        to: String,
        amount: f64,
    },
    /// Snapshot the group's balances at this point.
    Show,
}

impl Scenario {
    pub fn parse(contents: &str) -> CliResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_file(path: &Path) -> CliResult<Self> {
        info!(?path, "Loading scenario");
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn demo() -> CliResult<Self> {
        Self::parse(DEMO_SCENARIO)
    }
}

// =============================================================================
// Runner
// =============================================================================

/// Replays `scenario` and returns the snapshots it produced, in order.
///
/// Each group yields one snapshot per `show` event plus a final one after
/// its last event. `default_rounding` applies when neither the scenario nor
/// the expense picks a mode.
pub fn run(scenario: &Scenario, default_rounding: Rounding) -> CliResult<Vec<GroupBalances>> {
    let mut ledger = Ledger::new();
    let mut people: HashMap<&str, ParticipantId> = HashMap::new();

    for name in &scenario.participants {
        let id = ledger.create_participant(name)?;
        if people.insert(name.trim(), id).is_some() {
            return Err(CliError::Scenario(format!(
                "participant '{}' is declared twice",
                name.trim()
            )));
        }
    }

    let rounding = scenario.rounding.unwrap_or(default_rounding);
    let mut snapshots = Vec::new();

    for spec in &scenario.groups {
        let group = ledger.create_group(&spec.name)?;
        let lookup = Lookup { people: &people };

        for member in &spec.members {
            ledger.add_member_to_group(&group, lookup.id(member)?)?;
        }

        for (index, event) in spec.events.iter().enumerate() {
            let number = index + 1;
            debug!(group = %group, event = number, "Replaying event");
            apply_event(&mut ledger, &group, &lookup, event, rounding, &mut snapshots).map_err(
                |err| match err {
                    CliError::Ledger(source) => CliError::Event {
                        group: spec.name.clone(),
                        event: number,
                        source,
                    },
                    other => other,
                },
            )?;
        }

        snapshots.push(ledger.show_group_balances(&group)?);
    }

    info!(
        groups = scenario.groups.len(),
        snapshots = snapshots.len(),
        "Scenario replayed"
    );
    Ok(snapshots)
}

struct Lookup<'a> {
    people: &'a HashMap<&'a str, ParticipantId>,
}

impl Lookup<'_> {
    fn id(&self, name: &str) -> CliResult<&ParticipantId> {
        self.people
            .get(name.trim())
            .ok_or_else(|| CliError::Scenario(format!("unknown participant '{}'", name.trim())))
    }

    fn ids(&self, names: &[String]) -> CliResult<Vec<ParticipantId>> {
        names.iter().map(|n| self.id(n).cloned()).collect()
    }
}

fn apply_event(
    ledger: &mut Ledger,
    group: &GroupId,
    lookup: &Lookup<'_>,
    event: &ScenarioEvent,
    default_rounding: Rounding,
    snapshots: &mut Vec<GroupBalances>,
) -> CliResult<()> {
    match event {
        ScenarioEvent::Expense {
            description,
            amount,
            paid_by,
            split,
            participants,
            values,
            rounding,
        } => {
            let policy = match split {
                SplitKind::Equal => SplitPolicy::Equal,
                SplitKind::Exact => SplitPolicy::Exact(
                    values.iter().map(|v| to_money(*v)).collect::<CliResult<_>>()?,
                ),
                SplitKind::Percentage => SplitPolicy::Percentage(
                    values.iter().map(|v| to_percentage(*v)).collect::<CliResult<_>>()?,
                ),
            };

            let expense = Expense::new(
                description.as_str(),
                to_money(*amount)?,
                lookup.id(paid_by)?.clone(),
                lookup.ids(participants)?,
                policy,
            )
            .with_rounding(rounding.unwrap_or(default_rounding));

            ledger.add_expense(group, &expense)?;
        }
        ScenarioEvent::Settle { from, to, amount } => {
            ledger.settle(group, lookup.id(from)?, lookup.id(to)?, to_money(*amount)?)?;
        }
        ScenarioEvent::Show => snapshots.push(ledger.show_group_balances(group)?),
    }

    Ok(())
}

/// Converts a decimal amount to cents, rounding half away from zero.
///
/// Amounts whose cent count does not fit in an `i64` are rejected rather
/// than saturated.
fn to_money(value: f64) -> CliResult<Money> {
    let cents = (value * 100.0).round();
    // i64::MIN as f64 is exact (-2^63); i64::MAX as f64 rounds up to 2^63
    if !cents.is_finite() || cents < i64::MIN as f64 || cents >= i64::MAX as f64 {
        return Err(CliError::Scenario(format!("amount {} is out of range", value)));
    }
    Ok(Money::from_cents(cents as i64))
}

/// A single participant's share can never exceed 100%.
fn to_percentage(value: f64) -> CliResult<Percentage> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(CliError::Scenario(format!(
            "percentage {} must be between 0 and 100",
            value
        )));
    }
    Ok(Percentage::from_percent(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitledger_core::{report, ErrorKind};

    #[test]
    fn test_demo_scenario_output() {
        let snapshots = run(&Scenario::demo().unwrap(), Rounding::Truncate).unwrap();
        assert_eq!(snapshots.len(), 2);

        let shown = report::render(&snapshots[0], "Rs");
        assert!(shown.starts_with("Group Balances for Hostel:\nAditya:\n"));
        assert!(shown.contains("Rohit:\n  Owes Aditya Rs 200.00\n"));

        let last = &snapshots[1];
        assert_eq!(last.amount("user2", "user3"), Money::from_major(200));
        assert_eq!(last.amount("user3", "user2"), Money::from_major(-200));
        assert_eq!(last.amount("user2", "user1"), Money::from_major(-200));
    }

    #[test]
    fn test_percentage_and_rounding() {
        let scenario = Scenario::parse(
            r#"
            rounding = "half_even"
            participants = ["a", "b", "c"]

            [[groups]]
            name = "Trip"
            members = ["a", "b", "c"]

            [[groups.events]]
            kind = "expense"
            description = "Fuel"
            amount = 100.0
            paid_by = "a"
            split = "percentage"
            participants = ["a", "b", "c"]
            values = [33.34, 33.33, 33.33]
            "#,
        )
        .unwrap();

        let snapshots = run(&scenario, Rounding::Truncate).unwrap();
        let balances = &snapshots[0];
        assert_eq!(balances.amount("user1", "user2"), Money::from_cents(3_333));
        assert_eq!(balances.amount("user1", "user3"), Money::from_cents(3_333));
    }

    #[test]
    fn test_ledger_error_carries_event_position() {
        let scenario = Scenario::parse(
            r#"
            participants = ["a", "b"]

            [[groups]]
            name = "G"
            members = ["a", "b"]

            [[groups.events]]
            kind = "settle"
            from = "a"
            to = "b"
            amount = 5.0

            [[groups.events]]
            kind = "settle"
            from = "a"
            to = "a"
            amount = 5.0
            "#,
        )
        .unwrap();

        match run(&scenario, Rounding::Truncate) {
            Err(CliError::Event { group, event, source }) => {
                assert_eq!(group, "G");
                assert_eq!(event, 2);
                assert_eq!(source.kind(), ErrorKind::InvalidAmount);
            }
            other => panic!("expected event error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_and_duplicate_names() {
        let unknown = Scenario::parse(
            r#"
            participants = ["a"]
            [[groups]]
            name = "G"
            members = ["a", "zed"]
            "#,
        )
        .unwrap();
        assert!(matches!(
            run(&unknown, Rounding::Truncate),
            Err(CliError::Scenario(msg)) if msg.contains("zed")
        ));

        let duplicate = Scenario::parse(r#"participants = ["a", " a "]"#).unwrap();
        assert!(matches!(
            run(&duplicate, Rounding::Truncate),
            Err(CliError::Scenario(_))
        ));
    }

    #[test]
    fn test_amount_conversion() {
        assert_eq!(to_money(19.999).unwrap(), Money::from_cents(2_000));
        assert_eq!(to_money(0.1 + 0.2).unwrap(), Money::from_cents(30));
        assert!(to_money(f64::NAN).is_err());
        assert!(to_percentage(-1.0).is_err());
        assert_eq!(to_percentage(12.5).unwrap(), Percentage::from_bps(1_250));
        assert_eq!(to_percentage(100.0).unwrap(), Percentage::from_bps(10_000));
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        assert!(matches!(to_money(1e20), Err(CliError::Scenario(_))));
        assert!(matches!(to_money(-1e20), Err(CliError::Scenario(_))));
        assert!(matches!(to_money(f64::INFINITY), Err(CliError::Scenario(_))));
        assert_eq!(to_money(1e16).unwrap(), Money::from_cents(100_000_000_000_000_000));

        assert!(matches!(to_percentage(1e12), Err(CliError::Scenario(_))));
        assert!(to_percentage(100.01).is_err());

        let scenario = Scenario::parse(
            r#"
            participants = ["a", "b"]

            [[groups]]
            name = "G"
            members = ["a", "b"]

            [[groups.events]]
            kind = "settle"
            from = "a"
            to = "b"
            amount = 1e20
            "#,
        )
        .unwrap();
        assert!(matches!(
            run(&scenario, Rounding::Truncate),
            Err(CliError::Scenario(msg)) if msg.contains("out of range")
        ));
    }
}
