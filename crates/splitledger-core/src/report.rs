//! # Balance Reports
//!
//! Renders a [`GroupBalances`] snapshot as text.
//!
//! ```text
//! Group Balances for Hostel:
//! Aditya:
//!   Rohit owes Rs 200.00
//!   Owes Manish Rs 200.00
//! Saurav:
//!   No balances
//! ```
//!
//! A positive `bal[A][B]` reads "B owes A", a negative one "A owes B".

use std::fmt::{self, Write};

use crate::types::GroupBalances;

/// Currency symbol used by the `Display` impl of [`GroupBalances`].
pub const DEFAULT_CURRENCY_SYMBOL: &str = "Rs";

/// Renders `balances` with `currency_symbol` in front of every amount.
pub fn render(balances: &GroupBalances, currency_symbol: &str) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_report(&mut out, balances, currency_symbol);
    out
}

fn write_report<W: Write>(out: &mut W, balances: &GroupBalances, symbol: &str) -> fmt::Result {
    writeln!(out, "Group Balances for {}:", balances.group_name)?;

    for row in &balances.members {
        writeln!(out, "{}:", row.member_name)?;

        if row.entries.is_empty() {
            writeln!(out, "  No balances")?;
            continue;
        }

        for entry in &row.entries {
            if entry.amount.is_positive() {
                writeln!(out, "  {} owes {} {}", entry.other_name, symbol, entry.amount)?;
            } else if entry.amount.is_negative() {
                writeln!(out, "  Owes {} {} {}", entry.other_name, symbol, entry.amount.abs())?;
            }
        }
    }

    Ok(())
}

impl fmt::Display for GroupBalances {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_report(f, self, DEFAULT_CURRENCY_SYMBOL)
    }
}
