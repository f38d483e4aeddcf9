//! # merch-store: Session, Catalog and Storage for Merch POS
//!
//! Everything stateful sits in this crate. merch-core computes; this
//! crate remembers. A browser shell (or the demo binary) drives a
//! [`Session`], which owns the catalog, rules, open cart and ledger,
//! and persists them through a [`StorageBackend`].
//!
//! ## Layer Responsibilities
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        merch-store                                  │
//! │                                                                     │
//! │  ┌───────────┐   ┌───────────┐   ┌───────────────────────────────┐  │
//! │  │  session  │──►│  catalog  │   │           storage             │  │
//! │  │ sign-in,  │   │ products, │   │  Snapshot ◄─► StorageBackend  │  │
//! │  │ cart ops, │   │ search,   │   │  (key/value, versioned keys)  │  │
//! │  │ checkout, │   │ stock     │   └───────────────────────────────┘  │
//! │  │ void/ref. │   │ (impls    │                                      │
//! │  └─────┬─────┘   │ Inventory)│                                      │
//! │        │         └───────────┘                                      │
//! │        ▼                                                            │
//! │  merch-core: resolve() / aggregate() / Sale state machine           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod error;
pub mod session;
pub mod storage;

pub use catalog::Catalog;
pub use error::{StoreError, StoreResult};
pub use session::Session;
pub use storage::{MemoryStorage, Snapshot, StorageBackend};
