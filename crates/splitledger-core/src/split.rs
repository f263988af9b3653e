//! # Split Policy Engine
//!
//! Pure functions turning `(total, participants, policy)` into per-participant
//! shares.
//!
//! ## Policies
//! ```text
//! ┌────────────┬──────────────────────┬─────────────────┬───────────────────────┐
//! │ Policy     │ Parameters           │ Share           │ Validation            │
//! ├────────────┼──────────────────────┼─────────────────┼───────────────────────┤
//! │ Equal      │ none                 │ T / n           │ n ≥ 1                 │
//! │ Exact      │ amounts v₁…vₙ        │ vᵢ              │ |V| = n, ΣV = T       │
//! │ Percentage │ basis points v₁…vₙ   │ T · vᵢ / 10000  │ |V| = n, ΣV = 10000   │
//! └────────────┴──────────────────────┴─────────────────┴───────────────────────┘
//! ```
//!
//! ## Residual Cents
//! Equal and Percentage shares are rounded to whole cents, which can leave
//! `total - Σshares` a few cents off. The residual is handed out one cent at
//! a time to participants in list order (taken back the same way when
//! rounding overshoots), so every accepted split sums to the total exactly.

use std::collections::HashSet;

use crate::error::{LedgerError, LedgerResult};
use crate::money::Money;
use crate::types::{ParticipantId, Percentage, Rounding, Split, SplitPolicy};
use crate::validation::validate_positive_amount;

/// Computes the shares of `total` for `participants` under `policy`.
///
/// The result is aligned with `participants`. Nothing is produced when
/// validation fails.
///
/// ```rust
/// use splitledger_core::money::Money;
/// use splitledger_core::split::compute_splits;
/// use splitledger_core::types::{ParticipantId, Rounding, SplitPolicy};
///
/// let people: Vec<ParticipantId> = ["user1", "user2", "user3"].map(ParticipantId::from).to_vec();
/// let splits = compute_splits(Money::from_cents(1000), &people, &SplitPolicy::Equal, Rounding::Truncate).unwrap();
///
/// let cents: Vec<i64> = splits.iter().map(|s| s.amount.cents()).collect();
/// assert_eq!(cents, vec![334, 333, 333]);
/// ```
pub fn compute_splits(
    total: Money,
    participants: &[ParticipantId],
    policy: &SplitPolicy,
    rounding: Rounding,
) -> LedgerResult<Vec<Split>> {
    validate_positive_amount("expense total", total).map_err(LedgerError::InvalidAmount)?;
    validate_participants(participants)?;

    let shares = match policy {
        SplitPolicy::Equal => equal_shares(total, participants.len(), rounding),
        SplitPolicy::Exact(values) => exact_shares(total, participants.len(), values)?,
        SplitPolicy::Percentage(values) => {
            percentage_shares(total, participants.len(), values, rounding)?
        }
    };

    debug_assert_eq!(Money::checked_sum(&shares), Some(total));

    Ok(participants
        .iter()
        .zip(shares)
        .map(|(id, amount)| Split {
            participant_id: id.clone(),
            amount,
        })
        .collect())
}

fn validate_participants(participants: &[ParticipantId]) -> LedgerResult<()> {
    if participants.is_empty() {
        return Err(LedgerError::invalid_split("participant list is empty"));
    }

    let mut seen = HashSet::with_capacity(participants.len());
    for id in participants {
        if !seen.insert(id) {
            return Err(LedgerError::invalid_split(format!(
                "{} appears more than once",
                id
            )));
        }
    }

    Ok(())
}

fn check_count(policy: &str, values: usize, participants: usize) -> LedgerResult<()> {
    if values != participants {
        return Err(LedgerError::invalid_split(format!(
            "{} split has {} values for {} participants",
            policy, values, participants
        )));
    }
    Ok(())
}

fn equal_shares(total: Money, n: usize, rounding: Rounding) -> Vec<Money> {
    let share = total.divide(n, rounding);
    let mut shares = vec![share; n];
    distribute_residual(total, &mut shares);
    shares
}

fn exact_shares(total: Money, n: usize, values: &[Money]) -> LedgerResult<Vec<Money>> {
    check_count("exact", values.len(), n)?;

    if let Some(negative) = values.iter().find(|v| v.is_negative()) {
        return Err(LedgerError::invalid_split(format!(
            "exact amount {} is negative",
            negative
        )));
    }

    let Some(sum) = Money::checked_sum(values) else {
        return Err(LedgerError::invalid_split(
            "exact amounts overflow when summed",
        ));
    };
    if sum != total {
        return Err(LedgerError::invalid_split(format!(
            "exact amounts sum to {}, expected {}",
            sum, total
        )));
    }

    Ok(values.to_vec())
}

fn percentage_shares(
    total: Money,
    n: usize,
    values: &[Percentage],
    rounding: Rounding,
) -> LedgerResult<Vec<Money>> {
    check_count("percentage", values.len(), n)?;

    let sum_bps: u64 = values.iter().map(|p| p.bps() as u64).sum();
    if sum_bps != Percentage::FULL_BPS as u64 {
        return Err(LedgerError::invalid_split(format!(
            "percentages sum to {}, expected 100.00%",
            Percentage::from_bps(sum_bps.min(u32::MAX as u64) as u32)
        )));
    }

    let mut shares: Vec<Money> = values.iter().map(|p| total.percentage(*p, rounding)).collect();
    distribute_residual(total, &mut shares);
    Ok(shares)
}

/// Adjusts `shares` one cent at a time, in order, until they sum to `total`.
///
/// Cents are only taken back from positive shares, so no participant ends
/// up with a negative share.
fn distribute_residual(total: Money, shares: &mut [Money]) {
    let assigned: i128 = shares.iter().map(|s| s.cents() as i128).sum();
    let mut residual = total.cents() as i128 - assigned;
    let step = Money::from_cents(residual.signum() as i64);

    // |residual| < shares.len() for every rounding mode
    for share in shares.iter_mut() {
        if residual == 0 {
            break;
        }
        if residual < 0 && !share.is_positive() {
            continue;
        }
        *share += step;
        residual -= step.cents() as i128;
    }
}
