//! # Validation Module
//!
//! Field-level checks run before any ledger state is touched.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Host (CLI, scenario file)                                    │
//! │  ├── Parsing, name → id resolution                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Names non-blank and bounded                                       │
//! │  └── Amounts strictly positive                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Split engine / group ledger                                  │
//! │  ├── Membership closure                                                │
//! │  └── Split completeness, counts, duplicates                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_NAME_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a participant or group name.
///
/// ## Rules
/// - Must not be blank after trimming
/// - At most [`MAX_NAME_LEN`] characters
///
/// ## Returns
/// The trimmed name.
///
/// ```rust
/// use splitledger_core::validation::validate_name;
///
/// assert_eq!(validate_name("  Aditya ").unwrap(), "Aditya");
/// assert!(validate_name("   ").is_err());
/// ```
pub fn validate_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates that an amount is strictly positive.
///
/// `field` names the amount in the error ("expense total",
/// "settlement amount").
pub fn validate_positive_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("Hostel").unwrap(), "Hostel");
        assert_eq!(validate_name("\tRohit\n").unwrap(), "Rohit");

        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"A".repeat(MAX_NAME_LEN)).is_ok());
        assert!(validate_name(&"A".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_positive_amount() {
        assert!(validate_positive_amount("total", Money::from_cents(1)).is_ok());
        assert_eq!(
            validate_positive_amount("total", Money::zero()),
            Err(ValidationError::MustBePositive {
                field: "total".to_string()
            })
        );
        assert!(validate_positive_amount("total", Money::from_cents(-100)).is_err());
    }
}
