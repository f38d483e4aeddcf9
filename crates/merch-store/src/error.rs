//! # Store Error Types
//!
//! Error types for session and storage operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  CoreError (merch-core) ◄── price/ledger/validation rules              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds session and storage context           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Frontend displays user-friendly message                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use merch_core::CoreError;
use thiserror::Error;

/// Session and storage layer errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A business rule from merch-core was violated.
    ///
    /// ## When This Occurs
    /// - Voiding a sale that is not Paid
    /// - A non-admin attempts void/refund
    /// - Refund amount is not positive
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Entity not found in the session state.
    ///
    /// ## When This Occurs
    /// - Sale ID doesn't exist in the ledger
    /// - Product ID doesn't exist in the catalog
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation in the catalog.
    ///
    /// ## When This Occurs
    /// - Saving a product whose SKU belongs to a different product
    #[error("Duplicate {field}: '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// No employee is signed in for an operation that needs one.
    #[error("No employee signed in")]
    NotSignedIn,

    /// Checkout was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Snapshot serialization or deserialization failed.
    ///
    /// ## When This Occurs
    /// - Stored snapshot is corrupt or from an incompatible version
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// The storage backend rejected a read or write.
    #[error("Storage failed: {0}")]
    Storage(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Duplicate error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        StoreError::Duplicate {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = StoreError::not_found("Sale", "s-123");
        assert_eq!(err.to_string(), "Sale not found: s-123");
    }

    #[test]
    fn test_core_error_passes_through() {
        let err = StoreError::from(CoreError::ProductNotFound("p-9".to_string()));
        assert!(err.to_string().contains("p-9"));
    }
}
