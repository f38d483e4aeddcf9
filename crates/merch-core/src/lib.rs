//! # merch-core: Pure Business Logic for Merch POS
//!
//! The heart of the browser-resident till: every price, discount, tax
//! and ledger rule lives here as pure functions over in-memory values.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Merch POS Architecture                         │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │                 Frontend (browser UI)                         │  │
//! │  │   Catalog grid ──► Cart panel ──► Checkout ──► Sales history  │  │
//! │  └────────────────────────────┬──────────────────────────────────┘  │
//! │                               │ generated TS bindings               │
//! │  ┌────────────────────────────▼──────────────────────────────────┐  │
//! │  │                  merch-store (session layer)                  │  │
//! │  │   owns catalog, rules, cart, sales; storage snapshots         │  │
//! │  └────────────────────────────┬──────────────────────────────────┘  │
//! │                               │                                     │
//! │  ┌────────────────────────────▼──────────────────────────────────┐  │
//! │  │               ★ merch-core (THIS CRATE) ★                     │  │
//! │  │                                                               │  │
//! │  │  ┌────────┐ ┌────────┐ ┌─────────┐ ┌────────┐ ┌────────────┐  │  │
//! │  │  │ money  │ │ rules  │ │ pricing │ │  cart  │ │   ledger   │  │  │
//! │  │  │ Money  │ │RuleSet │ │ resolve │ │ totals │ │ Paid/Void/ │  │  │
//! │  │  │ cents  │ │ flash  │ │         │ │        │ │  Refund    │  │  │
//! │  │  └────────┘ └────────┘ └─────────┘ └────────┘ └────────────┘  │  │
//! │  │                                                               │  │
//! │  │  NO I/O • NO STORAGE • NO WALL CLOCK • PURE FUNCTIONS         │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer-cent arithmetic (no floats!)
//! - [`types`] - Domain types (Product, Employee, PricingConfig, ...)
//! - [`rules`] - Discount rule configuration (flash/product/category/global)
//! - [`pricing`] - The discount resolver
//! - [`cart`] - Cart state and the totals aggregator
//! - [`ledger`] - Sale snapshots and the Paid → Voided/Refunded machine
//! - [`inventory`] - The trait the stock owner implements
//! - [`clock`] - Injectable time source
//! - [`validation`] - Input validation rules
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input (including `now`) = same output
//! 2. **No I/O**: storage, network and the wall clock stay outside
//! 3. **Integer Money**: cents in i64, percentages in basis points
//! 4. **Explicit Errors**: financial-state violations are typed errors,
//!    interactive input degrades gracefully instead
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use merch_core::pricing::resolve;
//! use merch_core::rules::{DiscountKind, GlobalSale, RuleSet};
//! use merch_core::types::Product;
//!
//! let product = Product {
//!     id: "p-1".into(),
//!     sku: "TEE-001".into(),
//!     name: "Graphic Tee".into(),
//!     category: "T-Shirts".into(),
//!     price_cents: 2499,
//!     stock: 40,
//! };
//!
//! let mut rules = RuleSet::new();
//! rules.global_sale = Some(GlobalSale {
//!     label: "Storewide".into(),
//!     kind: DiscountKind::Percent { bps: 1000 }, // 10%
//!     active: true,
//! });
//!
//! let res = resolve(&product, &rules, Utc::now());
//! assert_eq!(res.discounted_price.cents(), 2249);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod clock;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod money;
pub mod pricing;
pub mod rules;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use merch_core::Money` instead of
// `use merch_core::money::Money`

pub use cart::{aggregate, Cart, CartLine, CartTotals};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, CoreResult, ValidationError};
pub use inventory::Inventory;
pub use ledger::{Sale, SaleItem, SaleStatus};
pub use money::Money;
pub use pricing::{resolve, AppliedDiscount, PriceResolution};
pub use rules::{CategorySale, DiscountKind, FlashSale, GlobalSale, ProductSale, RuleSet};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Flat sales tax in basis points (700 = 7%).
///
/// ## Business Reason
/// The store charges one flat rate; jurisdiction-aware tax is
/// deliberately out of scope.
pub const DEFAULT_TAX_RATE_BPS: u32 = 700;

/// Flat delivery charge in cents (6.50).
pub const SHIPPING_FLAT_RATE_CENTS: i64 = 650;

/// Subtotals at or above this many cents (100.00) ship free.
pub const FREE_SHIPPING_THRESHOLD_CENTS: i64 = 10_000;

/// Maximum distinct lines in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps transactions reviewable.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item in a cart.
///
/// ## Business Reason
/// Prevents accidental over-ordering (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
