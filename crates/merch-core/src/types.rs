//! # Domain Types
//!
//! Core domain types used throughout Merch POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────────────┐  │
//! │  │   Product     │   │   Employee    │   │    PricingConfig      │  │
//! │  │  ───────────  │   │  ───────────  │   │  ───────────────────  │  │
//! │  │  id (UUID)    │   │  id (UUID)    │   │  tax_rate (bps)       │  │
//! │  │  sku          │   │  name         │   │  shipping (flat +     │  │
//! │  │  category     │   │  role         │   │   free-over)          │  │
//! │  │  price_cents  │   └───────────────┘   └───────────────────────┘  │
//! │  │  stock        │                                                  │
//! │  └───────────────┘   Customer, Tender, Fulfillment: checkout        │
//! │                      metadata frozen into the sale snapshot         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 700 bps = 7.00% (the store's flat rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::from_bps(crate::DEFAULT_TAX_RATE_BPS)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// Owned by the catalog (the Inventory collaborator); the pricing and
/// cart layers only ever read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown on the tile and the receipt.
    pub name: String,

    /// Category string, matched exactly by category sales.
    pub category: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Current stock level. Never negative.
    pub stock: i64,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Shipping & Pricing Configuration
// =============================================================================

/// Flat-rate shipping with a free-over threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingRules {
    /// Flat delivery charge in cents.
    pub flat_rate_cents: i64,

    /// Subtotals at or above this many cents ship free.
    pub free_over_cents: i64,
}

impl ShippingRules {
    /// Returns the flat rate as Money.
    #[inline]
    pub fn flat_rate(&self) -> Money {
        Money::from_cents(self.flat_rate_cents)
    }

    /// Returns the free-over threshold as Money.
    #[inline]
    pub fn free_over(&self) -> Money {
        Money::from_cents(self.free_over_cents)
    }
}

impl Default for ShippingRules {
    /// Flat 6.50, free at or over 100.00.
    fn default() -> Self {
        ShippingRules {
            flat_rate_cents: crate::SHIPPING_FLAT_RATE_CENTS,
            free_over_cents: crate::FREE_SHIPPING_THRESHOLD_CENTS,
        }
    }
}

/// Everything the cart aggregator needs beyond the cart itself.
///
/// Fetched by the host before each aggregation pass, never mutated by
/// the core.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingConfig {
    pub tax_rate: TaxRate,
    pub shipping: ShippingRules,
}

// =============================================================================
// People
// =============================================================================

/// Privilege level for ledger operations.
///
/// `Admin` gates void and refund; everything else is open to staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    /// Whether this role may void or refund sales.
    #[inline]
    pub const fn is_elevated(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// An employee operating the till.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub role: Role,
}

/// Customer details collected at checkout. All fields optional in
/// practice; the till tolerates anonymous walk-ins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

// =============================================================================
// Checkout Metadata
// =============================================================================

/// How the order leaves the store. Delivery triggers the shipping
/// rules; pickup never charges shipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Fulfillment {
    Pickup,
    Delivery,
}

impl Fulfillment {
    /// True when the customer selected delivery.
    #[inline]
    pub const fn is_delivery(&self) -> bool {
        matches!(self, Fulfillment::Delivery)
    }
}

/// Payment tender recorded on the sale.
///
/// Mixed tender keeps both halves so the receipt can itemize them; the
/// core does not reconcile the split against the total (demo policy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Tender {
    Cash,
    Card,
    Mixed { cash_cents: i64, card_cents: i64 },
}

// =============================================================================
// Unit Tests
// =============================================================================
