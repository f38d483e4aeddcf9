//! # Sale Ledger
//!
//! A finalized sale is a frozen snapshot of an aggregated cart plus
//! payment, customer and employee metadata. The only mutation ever
//! permitted afterwards is a status transition.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 finalize                                            │
//! │   (cart, totals) ────────► Paid ──┬── void ───► Voided   (terminal) │
//! │                                   │                                 │
//! │                                   └── refund ─► Refunded (terminal) │
//! │                                                                     │
//! │   Stock: finalize decrements (floor 0), refund optionally restocks, │
//! │   void never restocks - a void assumes the transaction never        │
//! │   physically completed. Both transitions are admin-only.            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures leave the sale untouched; they are surfaced, never
//! swallowed, because they concern financial records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::{Cart, CartTotals};
use crate::error::{CoreError, CoreResult};
use crate::inventory::Inventory;
use crate::money::Money;
use crate::types::{Customer, Employee, Fulfillment, Tender};

// =============================================================================
// Sale Status
// =============================================================================

/// The lifecycle state of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Finalized and paid. The only state transitions leave from.
    Paid,
    /// Cancelled by an admin. Terminal.
    Voided,
    /// Money returned to the customer. Terminal.
    Refunded,
}

// =============================================================================
// Snapshots
// =============================================================================

/// A line item frozen into a sale. Copied from the cart line so the
/// record stays stable no matter what happens to the catalog later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleItem {
    pub product_id: String,
    pub sku: String,
    pub name: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
}

/// Who voided the sale, when, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VoidInfo {
    pub by: String,
    #[ts(as = "String")]
    pub at: DateTime<Utc>,
    pub reason: String,
}

/// Who refunded the sale, when, how much, and whether stock came back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefundInfo {
    pub by: String,
    #[ts(as = "String")]
    pub at: DateTime<Utc>,
    pub amount: Money,
    pub reason: String,
    pub restocked: bool,
}

// =============================================================================
// Sale
// =============================================================================

/// A finalized sale record.
///
/// Immutable once created except for its status transition and the
/// matching void/refund record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    pub id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub status: SaleStatus,
    pub items: Vec<SaleItem>,
    pub totals: CartTotals,
    pub customer: Customer,
    pub employee: Employee,
    pub tender: Tender,
    pub fulfillment: Fulfillment,
    pub void_info: Option<VoidInfo>,
    pub refund_info: Option<RefundInfo>,
}

impl Sale {
    /// Finalizes a cart into a `Paid` sale and decrements stock for
    /// every line item (floored at zero by the inventory).
    ///
    /// This is the only place in the system that decrements stock.
    pub fn finalize<I: Inventory>(
        cart: &Cart,
        totals: CartTotals,
        customer: Customer,
        employee: Employee,
        tender: Tender,
        fulfillment: Fulfillment,
        inventory: &mut I,
        now: DateTime<Utc>,
    ) -> Sale {
        let items: Vec<SaleItem> = cart
            .lines
            .iter()
            .map(|line| SaleItem {
                product_id: line.product_id.clone(),
                sku: line.sku.clone(),
                name: line.name.clone(),
                unit_price_cents: line.unit_base_cents,
                quantity: line.quantity,
            })
            .collect();

        for item in &items {
            inventory.adjust_stock(&item.product_id, -item.quantity);
        }

        Sale {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            status: SaleStatus::Paid,
            items,
            totals,
            customer,
            employee,
            tender,
            fulfillment,
            void_info: None,
            refund_info: None,
        }
    }

    /// Voids a paid sale. Admin only, `Paid` only.
    ///
    /// Deliberately does not restock: a void assumes the goods never
    /// left, so inventory was already reserved correctly. Restocking
    /// is an opt-in refund concern.
    pub fn void(&mut self, actor: &Employee, reason: &str, now: DateTime<Utc>) -> CoreResult<()> {
        if !actor.role.is_elevated() {
            return Err(CoreError::PermissionDenied {
                actor: actor.name.clone(),
                action: "void",
            });
        }
        if self.status != SaleStatus::Paid {
            return Err(CoreError::InvalidTransition {
                sale_id: self.id.clone(),
                status: self.status,
                action: "void",
            });
        }

        self.status = SaleStatus::Voided;
        self.void_info = Some(VoidInfo {
            by: actor.name.clone(),
            at: now,
            reason: reason.to_string(),
        });
        Ok(())
    }

    /// Refunds a paid sale. Admin only, `Paid` only, positive amount
    /// only.
    ///
    /// `amount` is not capped at the sale total: over-refunds are a
    /// caller-policy decision, deliberately not validated here. With
    /// `restock`, every item's quantity is added back to inventory.
    pub fn refund<I: Inventory>(
        &mut self,
        actor: &Employee,
        amount: Money,
        reason: &str,
        restock: bool,
        inventory: &mut I,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        if !actor.role.is_elevated() {
            return Err(CoreError::PermissionDenied {
                actor: actor.name.clone(),
                action: "refund",
            });
        }
        if self.status != SaleStatus::Paid {
            return Err(CoreError::InvalidTransition {
                sale_id: self.id.clone(),
                status: self.status,
                action: "refund",
            });
        }
        if !amount.is_positive() {
            return Err(CoreError::InvalidAmount {
                reason: format!("{amount} is not a positive amount"),
            });
        }

        if restock {
            for item in &self.items {
                inventory.adjust_stock(&item.product_id, item.quantity);
            }
        }

        self.status = SaleStatus::Refunded;
        self.refund_info = Some(RefundInfo {
            by: actor.name.clone(),
            at: now,
            amount,
            reason: reason.to_string(),
            restocked: restock,
        });
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Product, Role};
    use chrono::TimeZone;
    use std::collections::HashMap;

    struct TestCatalog {
        products: HashMap<String, Product>,
    }

    impl TestCatalog {
        fn new(products: Vec<Product>) -> Self {
            TestCatalog {
                products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
            }
        }

        fn stock(&self, id: &str) -> i64 {
            self.products[id].stock
        }
    }

    impl Inventory for TestCatalog {
        fn get_product(&self, id: &str) -> Option<Product> {
            self.products.get(id).cloned()
        }

        fn adjust_stock(&mut self, id: &str, delta: i64) {
            if let Some(p) = self.products.get_mut(id) {
                p.stock = (p.stock + delta).max(0);
            }
        }
    }

    fn admin() -> Employee {
        Employee {
            id: "e-1".to_string(),
            name: "Admin".to_string(),
            role: Role::Admin,
        }
    }

    fn staff() -> Employee {
        Employee {
            id: "e-2".to_string(),
            name: "Staff".to_string(),
            role: Role::Staff,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn catalog() -> TestCatalog {
        TestCatalog::new(vec![Product {
            id: "p-1".to_string(),
            sku: "HAT-001".to_string(),
            name: "Merch Hat".to_string(),
            category: "Hats".to_string(),
            price_cents: 1999,
            stock: 30,
        }])
    }

    fn paid_sale(catalog: &mut TestCatalog) -> Sale {
        let mut cart = Cart::new();
        cart.add(&catalog.get_product("p-1").unwrap(), 2).unwrap();
        let totals = CartTotals {
            subtotal: Money::from_cents(3998),
            discount_total: Money::zero(),
            shipping: Money::zero(),
            tax: Money::from_cents(280),
            grand_total: Money::from_cents(4278),
        };
        Sale::finalize(
            &cart,
            totals,
            Customer::default(),
            staff(),
            Tender::Cash,
            Fulfillment::Pickup,
            catalog,
            now(),
        )
    }

    #[test]
    fn test_finalize_snapshots_and_decrements_stock() {
        let mut catalog = catalog();
        let sale = paid_sale(&mut catalog);

        assert_eq!(sale.status, SaleStatus::Paid);
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.items[0].name, "Merch Hat");
        assert_eq!(sale.items[0].quantity, 2);
        assert_eq!(catalog.stock("p-1"), 28);
    }

    #[test]
    fn test_finalize_floors_stock_at_zero() {
        let mut catalog = catalog();
        let mut cart = Cart::new();
        let mut p = catalog.get_product("p-1").unwrap();
        p.stock = 1;
        catalog.products.insert("p-1".to_string(), p.clone());
        cart.add(&p, 5).unwrap();

        Sale::finalize(
            &cart,
            CartTotals::zero(),
            Customer::default(),
            staff(),
            Tender::Cash,
            Fulfillment::Pickup,
            &mut catalog,
            now(),
        );
        assert_eq!(catalog.stock("p-1"), 0);
    }

    #[test]
    fn test_void_by_admin() {
        let mut catalog = catalog();
        let mut sale = paid_sale(&mut catalog);

        sale.void(&admin(), "test void", now()).unwrap();
        assert_eq!(sale.status, SaleStatus::Voided);
        let info = sale.void_info.as_ref().unwrap();
        assert_eq!(info.by, "Admin");
        assert_eq!(info.reason, "test void");
        // voids never restock
        assert_eq!(catalog.stock("p-1"), 28);
    }

    #[test]
    fn test_void_by_staff_denied_and_state_unchanged() {
        let mut catalog = catalog();
        let mut sale = paid_sale(&mut catalog);

        let err = sale.void(&staff(), "nope", now()).unwrap_err();
        assert!(matches!(err, CoreError::PermissionDenied { .. }));
        assert_eq!(sale.status, SaleStatus::Paid);
        assert!(sale.void_info.is_none());
    }

    #[test]
    fn test_refund_restock_round_trip() {
        let mut catalog = catalog();
        let mut sale = paid_sale(&mut catalog);
        assert_eq!(catalog.stock("p-1"), 28);

        sale.refund(
            &admin(),
            Money::from_cents(4278),
            "customer return",
            true,
            &mut catalog,
            now(),
        )
        .unwrap();

        assert_eq!(sale.status, SaleStatus::Refunded);
        assert_eq!(catalog.stock("p-1"), 30); // back to pre-sale level
        let info = sale.refund_info.as_ref().unwrap();
        assert!(info.restocked);
        assert_eq!(info.amount.cents(), 4278);
    }

    #[test]
    fn test_refund_without_restock() {
        let mut catalog = catalog();
        let mut sale = paid_sale(&mut catalog);

        sale.refund(
            &admin(),
            Money::from_cents(1000),
            "partial",
            false,
            &mut catalog,
            now(),
        )
        .unwrap();
        assert_eq!(catalog.stock("p-1"), 28);
    }

    /// The refund amount is operator-entered and not capped at the
    /// sale total.
    #[test]
    fn test_over_refund_is_permitted() {
        let mut catalog = catalog();
        let mut sale = paid_sale(&mut catalog);

        sale.refund(
            &admin(),
            Money::from_cents(999_999),
            "goodwill",
            false,
            &mut catalog,
            now(),
        )
        .unwrap();
        assert_eq!(sale.refund_info.unwrap().amount.cents(), 999_999);
    }

    #[test]
    fn test_refund_rejects_non_positive_amount() {
        let mut catalog = catalog();
        let mut sale = paid_sale(&mut catalog);

        let err = sale
            .refund(&admin(), Money::zero(), "zero", false, &mut catalog, now())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));

        let err = sale
            .refund(
                &admin(),
                Money::from_cents(-100),
                "negative",
                false,
                &mut catalog,
                now(),
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));
        assert_eq!(sale.status, SaleStatus::Paid);
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        let mut catalog = catalog();

        // refund after void
        let mut voided = paid_sale(&mut catalog);
        voided.void(&admin(), "v", now()).unwrap();
        let err = voided
            .refund(
                &admin(),
                Money::from_cents(100),
                "r",
                false,
                &mut catalog,
                now(),
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));

        // void after refund
        let mut refunded = paid_sale(&mut catalog);
        refunded
            .refund(
                &admin(),
                Money::from_cents(100),
                "r",
                false,
                &mut catalog,
                now(),
            )
            .unwrap();
        let err = refunded.void(&admin(), "v", now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));

        // double void
        let err = voided.void(&admin(), "again", now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
    }

    #[test]
    fn test_sale_serde_round_trip() {
        let mut catalog = catalog();
        let sale = paid_sale(&mut catalog);

        let json = serde_json::to_string(&sale).unwrap();
        let back: Sale = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sale);
    }
}
