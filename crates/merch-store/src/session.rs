//! # Till Session
//!
//! The mutable state of one running register: catalog, rule set, open
//! cart, sale ledger and the signed-in employee. Every operation the
//! frontend exposes funnels through here, so the pure functions in
//! merch-core see consistent state.
//!
//! ## Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Operations                                   │
//! │                                                                         │
//! │  Frontend Action          Session Method          State Change          │
//! │  ───────────────          ──────────────          ────────────          │
//! │                                                                         │
//! │  Click Product ──────────► add_to_cart() ───────► cart.add(line)       │
//! │                                                                         │
//! │  Change Quantity ────────► set_quantity() ──────► cart line qty = n    │
//! │                                                                         │
//! │  Open Cart Panel ────────► totals() ────────────► (read only)          │
//! │                                                                         │
//! │  Click Charge ───────────► checkout() ──────────► sale appended,       │
//! │                                                   stock decremented,   │
//! │                                                   cart cleared         │
//! │                                                                         │
//! │  Admin Void ─────────────► void_sale() ─────────► status = Voided      │
//! │                                                                         │
//! │  Admin Refund ───────────► refund_sale() ───────► status = Refunded,   │
//! │                                                   optional restock     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Time
//! The session never reads the wall clock directly; it owns a
//! [`Clock`] and passes `now` into merch-core. Tests inject a
//! [`ManualClock`](merch_core::ManualClock) to pin flash sale windows.

use merch_core::cart::{aggregate, Cart, CartTotals};
use merch_core::rules::RuleSet;
use merch_core::{
    Clock, Customer, Employee, Fulfillment, Money, PricingConfig, Role, Sale, SystemClock, Tender,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::error::{StoreError, StoreResult};
use crate::storage::Snapshot;

/// One register's worth of state.
pub struct Session {
    catalog: Catalog,
    rules: RuleSet,
    cart: Cart,
    /// Newest sale first, matching the history screen.
    sales: Vec<Sale>,
    employees: Vec<Employee>,
    current: Option<Employee>,
    config: PricingConfig,
    clock: Box<dyn Clock>,
}

impl Session {
    /// Creates a session with an empty catalog and the system clock.
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    /// Creates a session with an injected clock.
    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Session {
            catalog: Catalog::new(),
            rules: RuleSet::new(),
            cart: Cart::new(),
            sales: Vec::new(),
            employees: seed_employees(),
            current: None,
            config: PricingConfig::default(),
            clock,
        }
    }

    /// Creates a session pre-loaded with the demo catalog.
    pub fn with_sample_data() -> Self {
        let mut session = Self::new();
        session.catalog = Catalog::with_sample_products();
        session
    }

    /// Restores a session from a snapshot.
    pub fn from_snapshot(snapshot: Snapshot, clock: Box<dyn Clock>) -> Self {
        let mut session = Self::with_clock(clock);
        session.catalog = Catalog::from_products(snapshot.products);
        session.rules = snapshot.rules;
        session.sales = snapshot.sales;
        session
    }

    /// Captures the persistent parts of the session.
    ///
    /// The open cart and sign-in are transient and not captured.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            products: self.catalog.list().to_vec(),
            rules: self.rules.clone(),
            sales: self.sales.clone(),
        }
    }

    // =========================================================================
    // Sign In / Out
    // =========================================================================

    /// Signs in the employee with the given ID.
    pub fn sign_in(&mut self, employee_id: &str) -> StoreResult<&Employee> {
        let employee = self
            .employees
            .iter()
            .find(|e| e.id == employee_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Employee", employee_id))?;

        info!(name = %employee.name, role = ?employee.role, "Signed in");
        Ok(self.current.insert(employee))
    }

    /// Signs the current employee out.
    pub fn sign_out(&mut self) {
        if let Some(employee) = self.current.take() {
            info!(name = %employee.name, "Signed out");
        }
    }

    /// The signed-in employee, if any.
    pub fn current_employee(&self) -> Option<&Employee> {
        self.current.as_ref()
    }

    /// The known employees (for the sign-in picker).
    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    fn require_employee(&self) -> StoreResult<Employee> {
        self.current.clone().ok_or(StoreError::NotSignedIn)
    }

    fn require_admin(&self, action: &'static str) -> StoreResult<Employee> {
        let employee = self.require_employee()?;
        if !employee.role.is_elevated() {
            return Err(merch_core::CoreError::PermissionDenied {
                actor: employee.name,
                action,
            }
            .into());
        }
        Ok(employee)
    }

    // =========================================================================
    // Catalog Access
    // =========================================================================

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Saves a product. Admin only.
    pub fn save_product(&mut self, product: merch_core::Product) -> StoreResult<String> {
        let actor = self.require_admin("edit products")?;
        let id = self.catalog.upsert(product)?;
        info!(product_id = %id, by = %actor.name, "Product saved");
        Ok(id)
    }

    /// Deletes a product. Admin only. Existing cart lines and sale
    /// snapshots keep their frozen copy.
    pub fn delete_product(&mut self, product_id: &str) -> StoreResult<()> {
        let actor = self.require_admin("edit products")?;
        self.catalog.delete(product_id)?;
        warn!(product_id = %product_id, by = %actor.name, "Product deleted");
        Ok(())
    }

    // =========================================================================
    // Rules
    // =========================================================================

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Replaces the discount rule set after validating it.
    pub fn set_rules(&mut self, rules: RuleSet) -> StoreResult<()> {
        rules.validate()?;
        info!(
            flash = rules.flash_sales.len(),
            product = rules.product_sales.len(),
            category = rules.category_sales.len(),
            global = rules.global_sale.is_some(),
            "Rule set replaced"
        );
        self.rules = rules;
        Ok(())
    }

    // =========================================================================
    // Cart Operations
    // =========================================================================

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Adds a product from the catalog to the cart.
    pub fn add_to_cart(&mut self, product_id: &str, quantity: i64) -> StoreResult<()> {
        let product = self
            .catalog
            .get(product_id)
            .ok_or_else(|| StoreError::not_found("Product", product_id))?
            .clone();

        self.cart.add(&product, quantity)?;
        Ok(())
    }

    /// Sets a cart line's quantity; zero removes the line.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> StoreResult<()> {
        self.cart.set_quantity(product_id, quantity)?;
        Ok(())
    }

    /// Removes a cart line.
    pub fn remove_from_cart(&mut self, product_id: &str) -> StoreResult<()> {
        self.cart.remove(product_id)?;
        Ok(())
    }

    /// Empties the cart.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    /// Computes totals for the open cart at the current instant.
    ///
    /// Pure read; calling it repeatedly with the same inputs and clock
    /// reading yields identical totals.
    pub fn totals(&self, fulfillment: Fulfillment, manual_discount: Option<&str>) -> CartTotals {
        aggregate(
            &self.cart,
            &self.catalog,
            &self.rules,
            self.clock.now(),
            fulfillment,
            manual_discount,
            &self.config,
        )
    }

    // =========================================================================
    // Checkout and Ledger
    // =========================================================================

    /// Finalizes the open cart into a Paid sale.
    ///
    /// ## Behavior
    /// - Requires a signed-in employee and a non-empty cart
    /// - Totals are computed at this instant and frozen into the sale
    /// - Stock is decremented per line (floored at zero)
    /// - The cart is cleared on success
    pub fn checkout(
        &mut self,
        customer: Customer,
        tender: Tender,
        fulfillment: Fulfillment,
        manual_discount: Option<&str>,
    ) -> StoreResult<&Sale> {
        let employee = self.require_employee()?;
        if self.cart.is_empty() {
            return Err(StoreError::EmptyCart);
        }

        // Lines whose product vanished since being added price as zero;
        // surface that in the log before committing the sale.
        for line in &self.cart.lines {
            if self.catalog.get(&line.product_id).is_none() {
                warn!(
                    product_id = %line.product_id,
                    sku = %line.sku,
                    "Cart line references a missing product, contributes zero"
                );
            }
        }

        let now = self.clock.now();
        let totals = aggregate(
            &self.cart,
            &self.catalog,
            &self.rules,
            now,
            fulfillment,
            manual_discount,
            &self.config,
        );

        let sale = Sale::finalize(
            &self.cart,
            totals,
            customer,
            employee,
            tender,
            fulfillment,
            &mut self.catalog,
            now,
        );

        info!(
            sale_id = %sale.id,
            grand_total = %sale.totals.grand_total,
            lines = sale.items.len(),
            "Checkout complete"
        );

        self.cart.clear();
        self.sales.insert(0, sale);
        Ok(&self.sales[0])
    }

    /// The sale ledger, newest first.
    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    /// Looks up a sale by ID.
    pub fn find_sale(&self, sale_id: &str) -> Option<&Sale> {
        self.sales.iter().find(|s| s.id == sale_id)
    }

    /// Voids a Paid sale. Admin only; stock is never restored.
    pub fn void_sale(&mut self, sale_id: &str, reason: &str) -> StoreResult<()> {
        let actor = self.require_employee()?;
        let now = self.clock.now();

        let sale = self
            .sales
            .iter_mut()
            .find(|s| s.id == sale_id)
            .ok_or_else(|| StoreError::not_found("Sale", sale_id))?;

        sale.void(&actor, reason, now)?;
        warn!(sale_id = %sale_id, by = %actor.name, "Sale voided");
        Ok(())
    }

    /// Refunds a Paid sale. Admin only.
    ///
    /// ## Arguments
    /// * `amount_input` - Raw string from the prompt ("25.00"); parsed
    ///   here so the ledger only ever sees validated Money
    /// * `restock` - Whether to return the sold quantities to stock
    pub fn refund_sale(
        &mut self,
        sale_id: &str,
        amount_input: &str,
        reason: &str,
        restock: bool,
    ) -> StoreResult<()> {
        let actor = self.require_employee()?;
        let now = self.clock.now();

        let amount = Money::parse(amount_input).ok_or_else(|| {
            merch_core::CoreError::InvalidAmount {
                reason: format!("'{}' is not a valid amount", amount_input.trim()),
            }
        })?;

        let sale = self
            .sales
            .iter_mut()
            .find(|s| s.id == sale_id)
            .ok_or_else(|| StoreError::not_found("Sale", sale_id))?;

        sale.refund(&actor, amount, reason, restock, &mut self.catalog, now)?;
        warn!(
            sale_id = %sale_id,
            amount = %amount,
            restocked = restock,
            by = %actor.name,
            "Sale refunded"
        );
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("products", &self.catalog.len())
            .field("cart_lines", &self.cart.line_count())
            .field("sales", &self.sales.len())
            .field("current", &self.current)
            .finish()
    }
}

/// The two demo accounts every fresh till starts with.
fn seed_employees() -> Vec<Employee> {
    vec![
        Employee {
            id: Uuid::new_v4().to_string(),
            name: "Admin".to_string(),
            role: Role::Admin,
        },
        Employee {
            id: Uuid::new_v4().to_string(),
            name: "Staff".to_string(),
            role: Role::Staff,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use merch_core::rules::{DiscountKind, FlashSale};
    use merch_core::{CoreError, ManualClock, SaleStatus};

    fn pinned_clock() -> Box<ManualClock> {
        Box::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ))
    }

    fn sample_session() -> Session {
        let mut session = Session::with_clock(pinned_clock());
        session.catalog = Catalog::with_sample_products();
        session
    }

    fn sign_in_as(session: &mut Session, role: Role) {
        let id = session
            .employees()
            .iter()
            .find(|e| e.role == role)
            .unwrap()
            .id
            .clone();
        session.sign_in(&id).unwrap();
    }

    fn product_id(session: &Session, sku: &str) -> String {
        session.catalog().get_by_sku(sku).unwrap().id.clone()
    }

    #[test]
    fn test_checkout_requires_sign_in() {
        let mut session = sample_session();
        let id = product_id(&session, "TEE-001");
        session.add_to_cart(&id, 1).unwrap();

        let err = session
            .checkout(Customer::default(), Tender::Cash, Fulfillment::Pickup, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotSignedIn));
    }

    #[test]
    fn test_checkout_requires_non_empty_cart() {
        let mut session = sample_session();
        sign_in_as(&mut session, Role::Staff);

        let err = session
            .checkout(Customer::default(), Tender::Cash, Fulfillment::Pickup, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::EmptyCart));
    }

    #[test]
    fn test_delivery_checkout_scenario() {
        // Two backpacks delivered: 99.98 + 6.50 shipping + 7.45 tax = 113.93
        let mut session = sample_session();
        sign_in_as(&mut session, Role::Staff);

        let id = product_id(&session, "OUT-001");
        session.add_to_cart(&id, 2).unwrap();

        let totals = session.totals(Fulfillment::Delivery, None);
        assert_eq!(totals.subtotal.cents(), 9998);
        assert_eq!(totals.shipping.cents(), 650);
        assert_eq!(totals.tax.cents(), 745);
        assert_eq!(totals.grand_total.cents(), 11393);

        let sale_id = session
            .checkout(
                Customer::default(),
                Tender::Card,
                Fulfillment::Delivery,
                None,
            )
            .unwrap()
            .id
            .clone();

        // Cart cleared, ledger grew, stock decremented
        assert!(session.cart().is_empty());
        assert_eq!(session.sales().len(), 1);
        assert_eq!(session.find_sale(&sale_id).unwrap().status, SaleStatus::Paid);
        assert_eq!(session.catalog().get(&id).unwrap().stock, 10);
    }

    #[test]
    fn test_flash_sale_windows_follow_the_clock() {
        let mut session = sample_session();
        let start = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();

        session
            .set_rules(RuleSet {
                flash_sales: vec![FlashSale {
                    id: "f-1".to_string(),
                    name: "Tee Day".to_string(),
                    target_product: Some("TEE-001".to_string()),
                    target_category: None,
                    kind: DiscountKind::Percent { bps: 5000 },
                    starts_at: Some(start),
                    ends_at: Some(start + Duration::hours(24)),
                    active: true,
                }],
                ..RuleSet::new()
            })
            .unwrap();

        let id = product_id(&session, "TEE-001");
        session.add_to_cart(&id, 1).unwrap();

        // Clock is pinned before the window opens
        let before = session.totals(Fulfillment::Pickup, None);
        assert_eq!(before.discount_total.cents(), 0);

        // Advance past the start and the same cart gets the discount
        session.clock = Box::new(ManualClock::new(start + Duration::hours(1)));
        let during = session.totals(Fulfillment::Pickup, None);
        assert_eq!(during.discount_total.cents(), 1250); // 50% of 24.99, rounded
    }

    #[test]
    fn test_invalid_rules_are_rejected_and_kept_out() {
        let mut session = sample_session();
        let bad = RuleSet {
            global_sale: Some(merch_core::rules::GlobalSale {
                label: "Broken".to_string(),
                kind: DiscountKind::Percent { bps: 20_000 },
                active: true,
            }),
            ..RuleSet::new()
        };

        assert!(session.set_rules(bad).is_err());
        assert!(session.rules().global_sale.is_none());
    }

    #[test]
    fn test_product_writes_require_admin() {
        let mut session = sample_session();
        sign_in_as(&mut session, Role::Staff);

        let mut mug = session.catalog().get_by_sku("MUG-001").unwrap().clone();
        mug.price_cents = 1399;

        let err = session.save_product(mug.clone()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::PermissionDenied { .. })
        ));

        sign_in_as(&mut session, Role::Admin);
        session.save_product(mug.clone()).unwrap();
        assert_eq!(session.catalog().get(&mug.id).unwrap().price_cents, 1399);

        session.delete_product(&mug.id).unwrap();
        assert!(session.catalog().get(&mug.id).is_none());
    }

    #[test]
    fn test_void_requires_admin() {
        let mut session = sample_session();
        sign_in_as(&mut session, Role::Staff);

        let id = product_id(&session, "MUG-001");
        session.add_to_cart(&id, 1).unwrap();
        let sale_id = session
            .checkout(Customer::default(), Tender::Cash, Fulfillment::Pickup, None)
            .unwrap()
            .id
            .clone();

        let err = session.void_sale(&sale_id, "mistake").unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::PermissionDenied { .. })
        ));
        assert_eq!(session.find_sale(&sale_id).unwrap().status, SaleStatus::Paid);
    }

    #[test]
    fn test_void_leaves_stock_alone() {
        let mut session = sample_session();
        sign_in_as(&mut session, Role::Admin);

        let id = product_id(&session, "MUG-001");
        session.add_to_cart(&id, 2).unwrap();
        let sale_id = session
            .checkout(Customer::default(), Tender::Cash, Fulfillment::Pickup, None)
            .unwrap()
            .id
            .clone();
        assert_eq!(session.catalog().get(&id).unwrap().stock, 23);

        session.void_sale(&sale_id, "entered twice").unwrap();
        assert_eq!(
            session.find_sale(&sale_id).unwrap().status,
            SaleStatus::Voided
        );
        // Void never restocks
        assert_eq!(session.catalog().get(&id).unwrap().stock, 23);
    }

    #[test]
    fn test_refund_with_restock() {
        let mut session = sample_session();
        sign_in_as(&mut session, Role::Admin);

        let id = product_id(&session, "HAT-001");
        session.add_to_cart(&id, 3).unwrap();
        let sale_id = session
            .checkout(Customer::default(), Tender::Card, Fulfillment::Pickup, None)
            .unwrap()
            .id
            .clone();
        assert_eq!(session.catalog().get(&id).unwrap().stock, 27);

        session
            .refund_sale(&sale_id, "10.00", "damaged", true)
            .unwrap();

        let sale = session.find_sale(&sale_id).unwrap();
        assert_eq!(sale.status, SaleStatus::Refunded);
        let refund = sale.refund_info.as_ref().unwrap();
        assert_eq!(refund.amount.cents(), 1000);
        assert!(refund.restocked);
        assert_eq!(session.catalog().get(&id).unwrap().stock, 30);
    }

    #[test]
    fn test_refund_rejects_garbage_amount() {
        let mut session = sample_session();
        sign_in_as(&mut session, Role::Admin);

        let id = product_id(&session, "HAT-001");
        session.add_to_cart(&id, 1).unwrap();
        let sale_id = session
            .checkout(Customer::default(), Tender::Cash, Fulfillment::Pickup, None)
            .unwrap()
            .id
            .clone();

        let err = session
            .refund_sale(&sale_id, "ten bucks", "typo", false)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::InvalidAmount { .. })
        ));
        assert_eq!(session.find_sale(&sale_id).unwrap().status, SaleStatus::Paid);
    }

    #[test]
    fn test_void_unknown_sale() {
        let mut session = sample_session();
        sign_in_as(&mut session, Role::Admin);

        assert!(matches!(
            session.void_sale("no-such-sale", "x"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_snapshot_round_trip_preserves_ledger() {
        let mut session = sample_session();
        sign_in_as(&mut session, Role::Staff);

        let id = product_id(&session, "STK-001");
        session.add_to_cart(&id, 5).unwrap();
        session
            .checkout(Customer::default(), Tender::Cash, Fulfillment::Pickup, None)
            .unwrap();

        let snapshot = session.snapshot();
        let restored = Session::from_snapshot(snapshot, pinned_clock());

        assert_eq!(restored.sales().len(), 1);
        assert_eq!(restored.catalog().get(&id).unwrap().stock, 245);
        // Transient state does not survive
        assert!(restored.cart().is_empty());
        assert!(restored.current_employee().is_none());
    }

    #[test]
    fn test_manual_discount_flows_through_totals() {
        let mut session = sample_session();
        let id = product_id(&session, "HD-001"); // 39.99

        session.add_to_cart(&id, 1).unwrap();
        let plain = session.totals(Fulfillment::Pickup, None);
        let discounted = session.totals(Fulfillment::Pickup, Some("10%"));

        assert!(discounted.grand_total < plain.grand_total);
        assert_eq!(
            discounted.discount_total.cents(),
            plain.grand_total.cents() - discounted.grand_total.cents()
        );
    }
}
