//! # Error Types
//!
//! Domain-specific error types for splitledger-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  splitledger-core errors (this file)                                   │
//! │  ├── LedgerError      - Rejected ledger operations                     │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  splitledger-cli errors (app)                                          │
//! │  └── CliError         - Config, scenario and I/O failures              │
//! │                                                                         │
//! │  Flow: ValidationError → LedgerError → CliError → stderr               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every public ledger operation is total: it either applies its change or
//! returns one of these errors and leaves state untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Ledger Error
// =============================================================================

/// Errors returned by the registry, split engine, group ledger and facades.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Participant id is not known to the registry.
    #[error("Participant not found: {0}")]
    ParticipantNotFound(String),

    /// Group id is not known to the facade.
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// Participant is not a member of the referenced group.
    ///
    /// ## When This Occurs
    /// - Payer or split participant was never added to the group
    /// - Settlement endpoint belongs to another group
    /// - Id was never issued at all (an unknown id cannot be a member)
    #[error("{participant_id} is not a member of {group_id}")]
    NotMember {
        group_id: String,
        participant_id: String,
    },

    /// Split parameters are incomplete, mismatched or duplicated.
    #[error("Invalid split: {reason}")]
    InvalidSplit { reason: String },

    /// Non-positive amount on an expense or settlement.
    #[error("Invalid amount: {0}")]
    InvalidAmount(ValidationError),

    /// Settlement where payer and receiver are the same participant.
    #[error("{participant_id} cannot settle with themselves")]
    SelfSettlement { participant_id: String },

    /// Applying the operation would push a pairwise balance out of range.
    #[error("Balance between {creditor} and {debtor} in {group_id} would overflow")]
    BalanceOverflow {
        group_id: String,
        creditor: String,
        debtor: String,
    },

    /// Blank or oversized name on creation.
    #[error("Invalid name: {0}")]
    InvalidName(ValidationError),
}

impl LedgerError {
    /// Shorthand for an [`LedgerError::InvalidSplit`] with a reason.
    pub fn invalid_split(reason: impl Into<String>) -> Self {
        LedgerError::InvalidSplit {
            reason: reason.into(),
        }
    }

    /// Maps this error onto the coarse kind callers branch on.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::ParticipantNotFound(_) | LedgerError::GroupNotFound(_) => {
                ErrorKind::NotFound
            }
            LedgerError::NotMember { .. } => ErrorKind::NotMember,
            LedgerError::InvalidSplit { .. } => ErrorKind::InvalidSplit,
            LedgerError::InvalidAmount(_)
            | LedgerError::SelfSettlement { .. }
            | LedgerError::BalanceOverflow { .. } => ErrorKind::InvalidAmount,
            LedgerError::InvalidName(_) => ErrorKind::InvalidName,
        }
    }
}

/// Coarse classification of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A referenced participant or group id is unknown.
    NotFound,
    /// A participant exists but is not in the referenced group.
    NotMember,
    /// Policy parameters violate completeness, count, duplicates or emptiness.
    InvalidSplit,
    /// Non-positive amount on expense or settlement.
    InvalidAmount,
    /// Blank name on creation.
    InvalidName,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when a single field doesn't meet requirements.
/// Used for early validation before ledger logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LedgerError::NotMember {
            group_id: "group1".to_string(),
            participant_id: "user9".to_string(),
        };
        assert_eq!(err.to_string(), "user9 is not a member of group1");

        let err = LedgerError::invalid_split("exact amounts sum to 90.00, expected 100.00");
        assert_eq!(
            err.to_string(),
            "Invalid split: exact amounts sum to 90.00, expected 100.00"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = LedgerError::InvalidAmount(ValidationError::MustBePositive {
            field: "settlement amount".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Invalid amount: settlement amount must be positive"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            LedgerError::GroupNotFound("group7".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            LedgerError::ParticipantNotFound("user7".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            LedgerError::SelfSettlement {
                participant_id: "user1".into()
            }
            .kind(),
            ErrorKind::InvalidAmount
        );
        assert_eq!(
            LedgerError::InvalidName(ValidationError::Required {
                field: "name".into()
            })
            .kind(),
            ErrorKind::InvalidName
        );
    }
}
