//! # Error Types
//!
//! Domain-specific error types for merch-core.
//!
//! ## Propagation Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Two classes of failure                                             │
//! │                                                                     │
//! │  DEGRADE GRACEFULLY (never an Err):                                 │
//! │  ├── unknown product in a cart line  → line contributes zero        │
//! │  └── malformed manual-discount input → treated as no discount       │
//! │      (an interactive till must not block on bad input)              │
//! │                                                                     │
//! │  SURFACE EXPLICITLY (always an Err):                                │
//! │  ├── InvalidTransition  - void/refund on a non-Paid sale            │
//! │  ├── PermissionDenied   - non-admin void/refund                     │
//! │  └── InvalidAmount      - non-positive refund amount               │
//! │      (these touch financial records and must never be dropped)      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (sale id, status, role)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::ledger::SaleStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found by id.
    ///
    /// Raised by CRUD paths; the cart aggregator deliberately skips
    /// unknown products instead of raising this.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Sale is not in a state that allows the requested operation.
    ///
    /// Void and refund are only legal from `Paid`; both terminal
    /// states reject everything.
    #[error("Sale {sale_id} is {status:?}, cannot {action}")]
    InvalidTransition {
        sale_id: String,
        status: SaleStatus,
        action: &'static str,
    },

    /// Actor lacks the privilege for a ledger operation.
    #[error("{actor} may not {action}: requires admin")]
    PermissionDenied {
        actor: String,
        action: &'static str,
    },

    /// Refund amount is non-positive.
    #[error("Invalid refund amount: {reason}")]
    InvalidAmount { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation of catalog edits and rule configuration
/// before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., bad characters in a SKU).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not allowed in this position (e.g., a free-shipping
    /// kind outside a flash sale).
    #[error("{field} not allowed here: {reason}")]
    NotAllowed { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidTransition {
            sale_id: "sale-1".to_string(),
            status: SaleStatus::Voided,
            action: "refund",
        };
        assert_eq!(err.to_string(), "Sale sale-1 is Voided, cannot refund");

        let err = CoreError::PermissionDenied {
            actor: "Staff".to_string(),
            action: "void",
        };
        assert_eq!(err.to_string(), "Staff may not void: requires admin");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "sku".to_string(),
        };
        assert_eq!(err.to_string(), "sku is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
