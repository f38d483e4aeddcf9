//! # Cart & Totals Aggregation
//!
//! The working cart (lines the cashier is building up) and the pure
//! aggregation pass that turns it into subtotal / discount / shipping /
//! tax / total.
//!
//! ## Aggregation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  per line:  look up product ──► resolve price ──► line base /       │
//! │             (missing product: line contributes zero, not an error)  │
//! │             line discounted                                         │
//! │                                                                     │
//! │  subtotal  = Σ line base                                            │
//! │  discount  = Σ (line base − line discounted)                        │
//! │  shipping  = 0 unless delivery; 0 if free-ship flag or              │
//! │              subtotal ≥ free-over; else flat rate                   │
//! │  tax       = rate × max(0, subtotal − discount + shipping)          │
//! │  manual    = parsed last, clamped to [0, total-before-manual]       │
//! │  total     = subtotal − discount + shipping + tax − manual          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `aggregate` is pure given its inputs (including `now`): the host
//! re-runs it on every cart mutation and must get identical totals for
//! identical inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::inventory::Inventory;
use crate::money::Money;
use crate::pricing::resolve;
use crate::rules::RuleSet;
use crate::types::{Fulfillment, PricingConfig, Product};
use crate::validation::validate_quantity;
use crate::MAX_CART_ITEMS;

// =============================================================================
// Cart Line
// =============================================================================

/// One line of the working cart.
///
/// Name, sku and unit price are frozen at add time so the cart renders
/// consistently even if an admin edits the product mid-session. The
/// aggregation pass still prices against the live catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,

    /// SKU at time of adding (frozen).
    pub sku: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Unit price in cents at time of adding (frozen).
    pub unit_base_cents: i64,

    /// Quantity in cart, always ≥ 1.
    pub quantity: i64,
}

impl CartLine {
    /// Creates a cart line from a product, freezing its display data.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            sku: product.sku.clone(),
            name: product.name.clone(),
            unit_base_cents: product.price_cents,
            quantity,
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The working cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (re-adding increases quantity)
/// - Quantity is ≥ 1 (setting 0 removes the line)
/// - At most [`MAX_CART_ITEMS`] lines, [`crate::MAX_ITEM_QUANTITY`] per line
///
/// Session-only: a cart never outlives checkout or an explicit clear.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds a product or increases its quantity if already present.
    pub fn add(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            let new_qty = line.quantity + quantity;
            validate_quantity(new_qty)?;
            line.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(ValidationError::OutOfRange {
                field: "cart lines".to_string(),
                min: 0,
                max: MAX_CART_ITEMS as i64,
            }
            .into());
        }

        self.lines.push(CartLine::from_product(product, quantity));
        Ok(())
    }

    /// Sets the quantity of a line; 0 removes it.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove(product_id);
        }
        validate_quantity(quantity)?;

        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::ProductNotFound(product_id.to_string())),
        }
    }

    /// Removes a line by product id.
    pub fn remove(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        if self.lines.len() == before {
            return Err(CoreError::ProductNotFound(product_id.to_string()));
        }
        Ok(())
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// The aggregated money figures for a cart. All non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub subtotal: Money,
    /// Automatic and manual discounts surfaced as one figure.
    pub discount_total: Money,
    pub shipping: Money,
    pub tax: Money,
    pub grand_total: Money,
}

impl CartTotals {
    /// All-zero totals (an empty cart).
    pub fn zero() -> Self {
        CartTotals {
            subtotal: Money::zero(),
            discount_total: Money::zero(),
            shipping: Money::zero(),
            tax: Money::zero(),
            grand_total: Money::zero(),
        }
    }
}

// =============================================================================
// Manual Discount
// =============================================================================

/// Parses the checkout-time manual discount field.
///
/// A trailing `%` means percent-of-total-before-manual; a bare
/// positive decimal is a fixed deduction. Anything malformed or
/// non-positive is silently ignored; an interactive till must not
/// block on bad input. The result is clamped to
/// `[0, total_before]` so the total can never go negative.
pub fn parse_manual_discount(input: &str, total_before: Money) -> Money {
    let s = input.trim();

    let amount = if let Some(pct_str) = s.strip_suffix('%') {
        // Money::parse gives hundredths, which are exactly basis
        // points for a percentage ("7.5" → 750 bps).
        match Money::parse(pct_str) {
            Some(pct) if pct.is_positive() => {
                let bps = u32::try_from(pct.cents()).unwrap_or(u32::MAX);
                total_before.take_percent_bps(bps)
            }
            _ => Money::zero(),
        }
    } else {
        match Money::parse(s) {
            Some(amount) if amount.is_positive() => amount,
            _ => Money::zero(),
        }
    };

    amount.clamp(Money::zero(), total_before)
}

// =============================================================================
// Aggregator
// =============================================================================

/// Computes [`CartTotals`] for a cart against the live catalog and
/// rule set at `now`.
///
/// Lines whose product no longer exists contribute zero, a tolerated
/// inconsistency, not an error. Pure and idempotent: identical inputs
/// (including `now`) produce identical totals.
pub fn aggregate<I: Inventory>(
    cart: &Cart,
    inventory: &I,
    rules: &RuleSet,
    now: DateTime<Utc>,
    fulfillment: Fulfillment,
    manual_discount: Option<&str>,
    config: &PricingConfig,
) -> CartTotals {
    // Nothing to price, nothing to ship
    if cart.is_empty() {
        return CartTotals::zero();
    }

    let mut subtotal = Money::zero();
    let mut discount_total = Money::zero();
    let mut free_shipping = false;

    for line in &cart.lines {
        let product = match inventory.get_product(&line.product_id) {
            Some(p) => p,
            None => continue, // tolerated: skip, zero contribution
        };

        let resolution = resolve(&product, rules, now);
        let line_base = resolution.base_price * line.quantity;
        let line_discounted = resolution.discounted_price * line.quantity;

        subtotal += line_base;
        discount_total += line_base - line_discounted;
        free_shipping = free_shipping || resolution.free_shipping();
    }

    let shipping = if !fulfillment.is_delivery() || free_shipping {
        Money::zero()
    } else if subtotal >= config.shipping.free_over() {
        Money::zero()
    } else {
        config.shipping.flat_rate()
    };

    let tax_base = (subtotal - discount_total + shipping).sub_floor_zero(Money::zero());
    let tax = tax_base.take_percent_bps(config.tax_rate.bps());

    let total_before_manual = subtotal - discount_total + shipping + tax;
    let manual = match manual_discount {
        Some(input) => parse_manual_discount(input, total_before_manual),
        None => Money::zero(),
    };

    CartTotals {
        subtotal,
        discount_total: discount_total + manual,
        shipping,
        tax,
        grand_total: total_before_manual - manual,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
