//! # splitledger-core: Expense-Sharing Ledger
//!
//! Pure, in-memory engine for splitting expenses inside groups and tracking
//! who owes whom.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      splitledger Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │           Host (splitledger-cli, tests, other services)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ splitledger-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐   ┌────────────┐   ┌────────────┐             │   │
//! │  │   │   Ledger   │──►│  Registry  │   │   report   │             │   │
//! │  │   │ SharedLedg │   │ ids, names │   │ text view  │             │   │
//! │  │   └─────┬──────┘   └────────────┘   └────────────┘             │   │
//! │  │         │                                                       │   │
//! │  │   ┌─────▼──────┐   ┌────────────┐   ┌────────────┐             │   │
//! │  │   │GroupLedger │──►│   split    │──►│   money    │             │   │
//! │  │   │ debt matrix│   │  policies  │   │   cents    │             │   │
//! │  │   └────────────┘   └────────────┘   └────────────┘             │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO PERSISTENCE • DETERMINISTIC                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic and rounding
//! - [`types`] - Ids, split policies, expenses, balance snapshots
//! - [`error`] - Ledger error types
//! - [`validation`] - Name and amount checks
//! - [`registry`] - Participant and group id allocation
//! - [`split`] - Split policy engine
//! - [`group`] - One group's debt matrix
//! - [`ledger`] - Single-threaded facade
//! - [`state`] - Thread-safe facade
//! - [`report`] - Text rendering of balances
//!
//! ## Example Usage
//!
//! ```rust
//! use splitledger_core::{Expense, Ledger, Money, SplitPolicy};
//!
//! let mut ledger = Ledger::new();
//! let aditya = ledger.create_participant("Aditya").unwrap();
//! let rohit = ledger.create_participant("Rohit").unwrap();
//! let hostel = ledger.create_group("Hostel").unwrap();
//! ledger.add_member_to_group(&hostel, &aditya).unwrap();
//! ledger.add_member_to_group(&hostel, &rohit).unwrap();
//!
//! let lunch = Expense::new(
//!     "Lunch",
//!     Money::from_major(400),
//!     aditya.clone(),
//!     vec![aditya.clone(), rohit.clone()],
//!     SplitPolicy::Equal,
//! );
//! ledger.add_expense(&hostel, &lunch).unwrap();
//!
//! // Rohit owes Aditya 200.00
//! assert_eq!(ledger.balance(&hostel, &aditya, &rohit).unwrap(), Money::from_major(200));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod group;
pub mod ledger;
pub mod money;
pub mod registry;
pub mod report;
pub mod split;
pub mod state;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{ErrorKind, LedgerError, LedgerResult, ValidationError};
pub use group::GroupLedger;
pub use ledger::Ledger;
pub use money::Money;
pub use state::SharedLedger;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a participant or group name, in characters.
pub const MAX_NAME_LEN: usize = 100;
