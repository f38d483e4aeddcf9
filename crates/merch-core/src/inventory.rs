//! # Inventory Interface
//!
//! The core never owns product stock; it reads products through this
//! trait and asks the owner to adjust stock when a sale finalizes or a
//! refund restocks.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │              Who touches stock, and when                            │
//! │                                                                     │
//! │  Sale::finalize ──► adjust_stock(id, -qty)   (only decrement site)  │
//! │  Sale::refund   ──► adjust_stock(id, +qty)   (only when restock)    │
//! │  Sale::void     ──► nothing                  (explicit policy)      │
//! │                                                                     │
//! │  Implementations floor stock at zero on decrement.                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::types::Product;

/// Read and mutate access to the product catalog.
///
/// The canonical implementation is `merch_store::Catalog`; tests use
/// small in-memory maps.
pub trait Inventory {
    /// Looks up a product by its id. `None` is tolerated by the cart
    /// aggregator (the line contributes zero) but surfaced by CRUD.
    fn get_product(&self, id: &str) -> Option<Product>;

    /// Adjusts stock by a signed delta, flooring the result at zero.
    /// Unknown ids are ignored.
    fn adjust_stock(&mut self, id: &str, delta: i64);
}
