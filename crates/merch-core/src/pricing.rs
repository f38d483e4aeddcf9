//! # Discount Resolver
//!
//! Resolves, for one product at one instant, which overlapping
//! discount sources apply and what the effective unit price is.
//!
//! ## Precedence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Tier 1  Flash sales (ordered)   FIRST PRICE MATCH WINS             │
//! │          │                       suppresses tiers 2-4 entirely     │
//! │          └── free-shipping flash: records the flag, then FALLS      │
//! │              THROUGH - the one exception to first-match-wins        │
//! │  Tier 2  Product sale (sku/id)   ┐                                  │
//! │  Tier 3  Category sale           ├── stack with each other,         │
//! │  Tier 4  Global sale             ┘   compounding on the running     │
//! │                                      price (100 → 90 → 81, not 80)  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The asymmetric free-shipping fall-through is store policy, not an
//! accident; `test_free_shipping_flash_falls_through` pins it.
//!
//! ## Freshness
//! Resolutions are produced fresh per call and must not be cached: a
//! flash window can open or expire between any two calls. Callers
//! re-resolve on every cart mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::rules::RuleSet;
use crate::types::Product;

// =============================================================================
// Resolution Output
// =============================================================================

/// One discount that applied to a unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppliedDiscount {
    /// Label for the cart line and receipt.
    pub label: String,
    /// How much this step took off the running price. Zero for
    /// free-shipping entries.
    pub amount: Money,
    /// Set only by free-shipping flash sales.
    pub free_shipping: bool,
}

/// The effective price of one product at one instant. Immutable;
/// produced fresh by every [`resolve`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceResolution {
    /// The untouched catalog price, kept for discount-total math.
    pub base_price: Money,
    /// The unit price after every applicable discount. Never negative,
    /// never above `base_price`.
    pub discounted_price: Money,
    /// Discounts in the order they applied.
    pub applied: Vec<AppliedDiscount>,
}

impl PriceResolution {
    /// Whether any applied discount waives shipping.
    pub fn free_shipping(&self) -> bool {
        self.applied.iter().any(|d| d.free_shipping)
    }

    /// The total amount taken off the base price.
    pub fn discount_amount(&self) -> Money {
        self.base_price - self.discounted_price
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolves the effective unit price of `product` under `rules` at
/// `now`.
///
/// When nothing matches, `discounted_price == base_price` and
/// `applied` is empty. Staleness of `rules` relative to `now` is the
/// caller's problem: re-fetch the rule set before each pass if
/// freshness matters.
pub fn resolve(product: &Product, rules: &RuleSet, now: DateTime<Utc>) -> PriceResolution {
    let base = product.price();
    let mut price = base;
    let mut applied: Vec<AppliedDiscount> = Vec::new();

    // Tier 1: flash sales, in configured order.
    for flash in &rules.flash_sales {
        if !flash.is_live(now) || !flash.matches(product) {
            continue;
        }

        if flash.kind.is_free_shipping() {
            // Side-channel flag only. Falls through so product/
            // category/global price discounts still apply.
            applied.push(AppliedDiscount {
                label: flash.name.clone(),
                amount: Money::zero(),
                free_shipping: true,
            });
            continue;
        }

        // First price match wins: apply and suppress every lower tier.
        let next = floor_zero(flash.kind.apply(price));
        applied.push(AppliedDiscount {
            label: flash.name.clone(),
            amount: price - next,
            free_shipping: false,
        });
        return PriceResolution {
            base_price: base,
            discounted_price: next,
            applied,
        };
    }

    // Tiers 2-4: stack sequentially, each against the running price.
    if let Some(sale) = rules.product_sale_for(product) {
        let next = floor_zero(sale.kind.apply(price));
        applied.push(AppliedDiscount {
            label: "Item sale".to_string(),
            amount: price - next,
            free_shipping: false,
        });
        price = next;
    }

    if let Some(sale) = rules.category_sale_for(product) {
        let next = floor_zero(sale.kind.apply(price));
        applied.push(AppliedDiscount {
            label: format!("{} sale", sale.category),
            amount: price - next,
            free_shipping: false,
        });
        price = next;
    }

    if let Some(global) = rules.active_global_sale() {
        let next = floor_zero(global.kind.apply(price));
        applied.push(AppliedDiscount {
            label: global.label.clone(),
            amount: price - next,
            free_shipping: false,
        });
        price = next;
    }

    PriceResolution {
        base_price: base,
        discounted_price: price,
        applied,
    }
}

/// Final guard: a discounted price is never negative, even under a
/// configuration that escaped validation.
#[inline]
fn floor_zero(price: Money) -> Money {
    if price.is_negative() {
        Money::zero()
    } else {
        price
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{CategorySale, DiscountKind, FlashSale, GlobalSale, ProductSale};
    use chrono::TimeZone;

    fn product(price_cents: i64) -> Product {
        Product {
            id: "p-1".to_string(),
            sku: "HD-001".to_string(),
            name: "Logo Hoodie".to_string(),
            category: "Hoodies & Sweatshirts".to_string(),
            price_cents,
            stock: 18,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn flash(name: &str, kind: DiscountKind) -> FlashSale {
        FlashSale {
            id: format!("flash-{name}"),
            name: name.to_string(),
            target_product: None,
            target_category: None,
            kind,
            starts_at: Some(now() - chrono::Duration::hours(1)),
            ends_at: Some(now() + chrono::Duration::hours(1)),
            active: true,
        }
    }

    fn product_sale(bps: u32) -> ProductSale {
        ProductSale {
            product_key: "HD-001".to_string(),
            kind: DiscountKind::Percent { bps },
            active: true,
        }
    }

    fn global_sale(bps: u32) -> GlobalSale {
        GlobalSale {
            label: "Storewide".to_string(),
            kind: DiscountKind::Percent { bps },
            active: true,
        }
    }

    #[test]
    fn test_no_rules_no_discount() {
        let p = product(3999);
        let res = resolve(&p, &RuleSet::new(), now());
        assert_eq!(res.base_price.cents(), 3999);
        assert_eq!(res.discounted_price.cents(), 3999);
        assert!(res.applied.is_empty());
        assert!(!res.free_shipping());
    }

    #[test]
    fn test_flash_percent_suppresses_lower_tiers() {
        let p = product(10000);
        let mut rules = RuleSet::new();
        rules
            .flash_sales
            .push(flash("Flash 20", DiscountKind::Percent { bps: 2000 }));
        rules
            .product_sales
            .insert("HD-001".to_string(), product_sale(1000));
        rules.global_sale = Some(global_sale(1000));

        let res = resolve(&p, &rules, now());
        assert_eq!(res.discounted_price.cents(), 8000);
        // exactly one non-free-shipping entry: the flash sale
        let price_entries: Vec<_> = res.applied.iter().filter(|d| !d.free_shipping).collect();
        assert_eq!(price_entries.len(), 1);
        assert_eq!(price_entries[0].label, "Flash 20");
    }

    #[test]
    fn test_flash_first_match_wins_in_order() {
        let p = product(10000);
        let mut rules = RuleSet::new();
        rules
            .flash_sales
            .push(flash("First", DiscountKind::Percent { bps: 1000 }));
        rules
            .flash_sales
            .push(flash("Second", DiscountKind::Percent { bps: 5000 }));

        let res = resolve(&p, &rules, now());
        assert_eq!(res.discounted_price.cents(), 9000);
        assert_eq!(res.applied.len(), 1);
        assert_eq!(res.applied[0].label, "First");
    }

    #[test]
    fn test_expired_flash_is_skipped() {
        let p = product(10000);
        let mut rules = RuleSet::new();
        let mut expired = flash("Expired", DiscountKind::Percent { bps: 5000 });
        expired.ends_at = Some(now() - chrono::Duration::minutes(1));
        rules.flash_sales.push(expired);
        rules.global_sale = Some(global_sale(1000));

        let res = resolve(&p, &rules, now());
        // flash out of window, global applies instead
        assert_eq!(res.discounted_price.cents(), 9000);
        assert_eq!(res.applied[0].label, "Storewide");
    }

    /// Pins the deliberate asymmetry: a free-shipping flash sale flags
    /// the resolution but does NOT consume the first-match slot, so
    /// lower price tiers still apply. Easy to "fix" accidentally.
    #[test]
    fn test_free_shipping_flash_falls_through() {
        let p = product(10000);
        let mut rules = RuleSet::new();
        rules
            .flash_sales
            .push(flash("Ship Free", DiscountKind::FreeShipping));
        rules
            .product_sales
            .insert("HD-001".to_string(), product_sale(1000));
        rules.global_sale = Some(global_sale(1000));

        let res = resolve(&p, &rules, now());
        assert!(res.free_shipping());
        // price discounts still compound: 100 → 90 → 81
        assert_eq!(res.discounted_price.cents(), 8100);
        let price_entries: Vec<_> = res.applied.iter().filter(|d| !d.free_shipping).collect();
        assert_eq!(price_entries.len(), 2);
        // the free-shipping entry itself carries no price discount
        let ship = res.applied.iter().find(|d| d.free_shipping).unwrap();
        assert!(ship.amount.is_zero());
    }

    #[test]
    fn test_free_shipping_then_price_flash_both_recorded() {
        let p = product(10000);
        let mut rules = RuleSet::new();
        rules
            .flash_sales
            .push(flash("Ship Free", DiscountKind::FreeShipping));
        rules
            .flash_sales
            .push(flash("Flash 25", DiscountKind::Percent { bps: 2500 }));

        let res = resolve(&p, &rules, now());
        assert!(res.free_shipping());
        assert_eq!(res.discounted_price.cents(), 7500);
        assert_eq!(res.applied.len(), 2);
    }

    #[test]
    fn test_lower_tiers_compound_sequentially() {
        // base 100, product 10%, global 10% ⇒ 100 → 90 → 81, not 80
        let p = product(10000);
        let mut rules = RuleSet::new();
        rules
            .product_sales
            .insert("HD-001".to_string(), product_sale(1000));
        rules.global_sale = Some(global_sale(1000));

        let res = resolve(&p, &rules, now());
        assert_eq!(res.discounted_price.cents(), 8100);
        assert_eq!(res.applied[0].amount.cents(), 1000);
        assert_eq!(res.applied[1].amount.cents(), 900);
        assert_eq!(res.discount_amount().cents(), 1900);
    }

    #[test]
    fn test_all_three_standing_tiers_stack() {
        let p = product(10000);
        let mut rules = RuleSet::new();
        rules
            .product_sales
            .insert("HD-001".to_string(), product_sale(1000));
        rules.category_sales.insert(
            "Hoodies & Sweatshirts".to_string(),
            CategorySale {
                category: "Hoodies & Sweatshirts".to_string(),
                kind: DiscountKind::Percent { bps: 1000 },
                active: true,
            },
        );
        rules.global_sale = Some(global_sale(1000));

        // 100 → 90 → 81 → 72.90
        let res = resolve(&p, &rules, now());
        assert_eq!(res.discounted_price.cents(), 7290);
        assert_eq!(res.applied.len(), 3);
        assert_eq!(res.applied[1].label, "Hoodies & Sweatshirts sale");
    }

    #[test]
    fn test_amount_discounts_floor_at_zero() {
        let p = product(500);
        let mut rules = RuleSet::new();
        rules.product_sales.insert(
            "HD-001".to_string(),
            ProductSale {
                product_key: "HD-001".to_string(),
                kind: DiscountKind::Amount { cents: 400 },
                active: true,
            },
        );
        rules.global_sale = Some(GlobalSale {
            label: "Storewide".to_string(),
            kind: DiscountKind::Amount { cents: 400 },
            active: true,
        });

        // 5.00 → 1.00 → floored at 0
        let res = resolve(&p, &rules, now());
        assert_eq!(res.discounted_price.cents(), 0);
        assert_eq!(res.applied[1].amount.cents(), 100);
    }

    #[test]
    fn test_discounted_price_bounded_by_base() {
        let p = product(2499);
        let mut rules = RuleSet::new();
        rules
            .flash_sales
            .push(flash("Big", DiscountKind::Amount { cents: 99_999 }));

        let res = resolve(&p, &rules, now());
        assert!(res.discounted_price >= Money::zero());
        assert!(res.discounted_price <= res.base_price);
    }

    #[test]
    fn test_resolution_is_pure_given_same_now() {
        let p = product(4999);
        let mut rules = RuleSet::new();
        rules
            .flash_sales
            .push(flash("Flash", DiscountKind::Percent { bps: 1500 }));

        let a = resolve(&p, &rules, now());
        let b = resolve(&p, &rules, now());
        assert_eq!(a, b);
    }
}
