//! # Storage Snapshots
//!
//! Serializes store state to a key/value backend so a till survives a
//! restart. The backend is a trait; tests and the demo use the in-memory
//! one, the browser shell plugs in its own persistent map.
//!
//! ## Snapshot Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Key/Value Layout                                     │
//! │                                                                         │
//! │  merch_products_v1  ─► JSON array of Product                           │
//! │  merch_rules_v1     ─► JSON RuleSet (flash/product/category/global)    │
//! │  merch_sales_v1     ─► JSON array of Sale (newest first)               │
//! │                                                                         │
//! │  Keys carry a version suffix; a format change bumps the suffix and     │
//! │  old keys are simply ignored.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use merch_core::rules::RuleSet;
use merch_core::{Product, Sale};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreResult;

/// Storage key for the product catalog.
pub const KEY_PRODUCTS: &str = "merch_products_v1";
/// Storage key for the discount rule set.
pub const KEY_RULES: &str = "merch_rules_v1";
/// Storage key for the sale ledger.
pub const KEY_SALES: &str = "merch_sales_v1";

/// A string key/value store the till persists snapshots into.
///
/// Implementations must be durable across process restarts to be useful,
/// but the contract itself is just get/set by key.
pub trait StorageBackend {
    /// Reads the value stored at `key`, if any.
    fn load(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes `value` at `key`, replacing any previous value.
    fn store(&mut self, key: &str, value: &str) -> StoreResult<()>;

    /// Deletes the value at `key`. Missing keys are not an error.
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

/// In-memory backend for tests and the demo binary.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn store(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Everything a till needs to resume where it left off.
///
/// The open cart and the signed-in employee are deliberately *not*
/// persisted; a restart starts a fresh transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub products: Vec<Product>,
    pub rules: RuleSet,
    pub sales: Vec<Sale>,
}

impl Snapshot {
    /// Writes the snapshot to the backend, one key per section.
    pub fn save(&self, backend: &mut dyn StorageBackend) -> StoreResult<()> {
        backend.store(KEY_PRODUCTS, &serde_json::to_string(&self.products)?)?;
        backend.store(KEY_RULES, &serde_json::to_string(&self.rules)?)?;
        backend.store(KEY_SALES, &serde_json::to_string(&self.sales)?)?;

        debug!(
            products = self.products.len(),
            sales = self.sales.len(),
            "Saved snapshot"
        );
        Ok(())
    }

    /// Reads a snapshot from the backend.
    ///
    /// Missing keys fall back to that section's default, so a fresh
    /// backend loads as an empty snapshot rather than an error. A key
    /// that is present but malformed *is* an error.
    pub fn load(backend: &dyn StorageBackend) -> StoreResult<Self> {
        let products = match backend.load(KEY_PRODUCTS)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };
        let rules = match backend.load(KEY_RULES)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => RuleSet::default(),
        };
        let sales = match backend.load(KEY_SALES)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };

        Ok(Snapshot {
            products,
            rules,
            sales,
        })
    }
}
