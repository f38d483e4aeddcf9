//! # Discount Rules
//!
//! The rule configuration the resolver evaluates: time-windowed flash
//! sales, per-product and per-category sales, and one optional
//! storewide sale.
//!
//! ## Lifecycle
//! A `RuleSet` is a value: loaded at session start, possibly replaced
//! wholesale when an admin edits schedules, and handed to the resolver
//! together with `now` on every call. Nothing in the core caches a
//! resolution across calls; a flash window can open or close between
//! any two of them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Product;
use crate::validation::validate_percent_bps;

// =============================================================================
// Discount Kind
// =============================================================================

/// What a discount does to a unit price.
///
/// One enum serves all four rule tiers, mirroring the single `type`
/// field of the stored configuration. `FreeShipping` is only legal on
/// flash sales; `RuleSet::validate` enforces that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DiscountKind {
    /// Percentage off, in basis points (1000 = 10%).
    Percent { bps: u32 },
    /// Fixed amount off, in cents. Floors the price at zero.
    Amount { cents: i64 },
    /// Waives the shipping charge; leaves the price untouched.
    FreeShipping,
}

impl DiscountKind {
    /// Applies this discount to a running price.
    ///
    /// Percent rounds half away from zero; Amount floors at zero;
    /// FreeShipping is a side-channel flag and returns the price
    /// unchanged.
    pub fn apply(&self, price: Money) -> Money {
        match *self {
            DiscountKind::Percent { bps } => price - price.take_percent_bps(bps),
            DiscountKind::Amount { cents } => price.sub_floor_zero(Money::from_cents(cents)),
            DiscountKind::FreeShipping => price,
        }
    }

    /// Whether this kind waives shipping instead of cutting price.
    #[inline]
    pub const fn is_free_shipping(&self) -> bool {
        matches!(self, DiscountKind::FreeShipping)
    }

    fn validate(&self, field: &str, allow_free_shipping: bool) -> CoreResult<()> {
        match *self {
            DiscountKind::Percent { bps } => validate_percent_bps(bps)?,
            DiscountKind::Amount { cents } => {
                if cents < 0 {
                    return Err(ValidationError::MustBePositive {
                        field: format!("{field} amount"),
                    }
                    .into());
                }
            }
            DiscountKind::FreeShipping => {
                if !allow_free_shipping {
                    return Err(ValidationError::NotAllowed {
                        field: field.to_string(),
                        reason: "free shipping is only valid on flash sales".to_string(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Rule Variants
// =============================================================================

/// A discount active only inside an explicit time window.
///
/// Targets one product (by id or sku), one category, or, with neither
/// set, the whole store, which is how the admin screen renders an
/// empty category as "All".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FlashSale {
    pub id: String,
    /// Label shown on the cart line and receipt.
    pub name: String,
    /// Product id or sku. Takes precedence over the category target.
    pub target_product: Option<String>,
    /// Exact category match. Only consulted when no product target.
    pub target_category: Option<String>,
    pub kind: DiscountKind,
    /// Missing bound = unbounded on that side.
    #[ts(as = "Option<String>")]
    pub starts_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub ends_at: Option<DateTime<Utc>>,
    pub active: bool,
}

impl FlashSale {
    /// Whether the sale window contains `now` (bounds inclusive).
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        if !self.active {
            return false;
        }
        if let Some(start) = self.starts_at {
            if now < start {
                return false;
            }
        }
        if let Some(end) = self.ends_at {
            if now > end {
                return false;
            }
        }
        true
    }

    /// Whether this sale targets the given product.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(target) = &self.target_product {
            return *target == product.id || *target == product.sku;
        }
        if let Some(category) = &self.target_category {
            return *category == product.category;
        }
        // no target at all: storewide
        true
    }
}

/// A standing sale on one product, keyed by sku or id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductSale {
    pub product_key: String,
    pub kind: DiscountKind,
    pub active: bool,
}

/// A standing sale on every product in a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategorySale {
    pub category: String,
    pub kind: DiscountKind,
    pub active: bool,
}

/// A storewide sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GlobalSale {
    /// Label shown on the cart line and receipt.
    pub label: String,
    pub kind: DiscountKind,
    pub active: bool,
}

// =============================================================================
// Rule Set
// =============================================================================

/// The active discount configuration.
///
/// Flash sales are an ordered sequence: the resolver honors first
/// match. Product and category sales are keyed maps; the global sale
/// is at most one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RuleSet {
    pub flash_sales: Vec<FlashSale>,
    /// Keyed by product sku or id.
    pub product_sales: HashMap<String, ProductSale>,
    /// Keyed by exact category string.
    pub category_sales: HashMap<String, CategorySale>,
    pub global_sale: Option<GlobalSale>,
}

impl RuleSet {
    /// An empty configuration: every product resolves to its base price.
    pub fn new() -> Self {
        RuleSet::default()
    }

    /// Finds the active product sale for a product, trying its sku
    /// first, then its id.
    pub fn product_sale_for(&self, product: &Product) -> Option<&ProductSale> {
        self.product_sales
            .get(&product.sku)
            .or_else(|| self.product_sales.get(&product.id))
            .filter(|sale| sale.active)
    }

    /// Finds the active category sale for a product's category.
    pub fn category_sale_for(&self, product: &Product) -> Option<&CategorySale> {
        self.category_sales
            .get(&product.category)
            .filter(|sale| sale.active)
    }

    /// The active global sale, if any.
    pub fn active_global_sale(&self) -> Option<&GlobalSale> {
        self.global_sale.as_ref().filter(|sale| sale.active)
    }

    /// Validates an externally supplied configuration.
    ///
    /// Checks percent values stay within [0, 100%], amounts are
    /// non-negative, and free shipping only appears on flash sales.
    pub fn validate(&self) -> CoreResult<()> {
        for flash in &self.flash_sales {
            flash.kind.validate("flash sale", true)?;
        }
        for sale in self.product_sales.values() {
            sale.kind.validate("product sale", false)?;
        }
        for sale in self.category_sales.values() {
            sale.kind.validate("category sale", false)?;
        }
        if let Some(global) = &self.global_sale {
            global.kind.validate("global sale", false)?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
