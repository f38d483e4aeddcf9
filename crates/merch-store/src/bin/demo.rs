//! # Register Walkthrough
//!
//! Drives one till session end to end: seed the catalog, configure a
//! flash sale, ring up a delivery order, then void and refund from the
//! history screen.
//!
//! ## Usage
//! ```bash
//! cargo run -p merch-store --bin demo
//!
//! # With debug logging
//! RUST_LOG=debug cargo run -p merch-store --bin demo
//! ```

use merch_core::rules::{DiscountKind, FlashSale, RuleSet};
use merch_core::{Customer, Fulfillment, Role, Tender};
use merch_store::{MemoryStorage, Session, Snapshot};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("Merch POS Register Walkthrough");
    println!("==============================");
    println!();

    let mut session = Session::with_sample_data();
    println!("✓ Seeded {} products", session.catalog().len());
    for product in session.catalog().list() {
        println!(
            "    {:<10} {:<22} {:>8}  stock {}",
            product.sku,
            product.name,
            product.price(),
            product.stock
        );
    }

    // A storewide flash sale, open-ended so the walkthrough always hits it
    session.set_rules(RuleSet {
        flash_sales: vec![FlashSale {
            id: "flash-weekend".to_string(),
            name: "Weekend Flash".to_string(),
            target_product: None,
            target_category: Some("T-Shirts".to_string()),
            kind: DiscountKind::Percent { bps: 2000 }, // 20% off tees
            starts_at: None,
            ends_at: None,
            active: true,
        }],
        ..RuleSet::new()
    })?;
    println!();
    println!("✓ Flash sale live: 20% off T-Shirts");

    // Sign in as staff and build a delivery order
    let staff_id = session
        .employees()
        .iter()
        .find(|e| e.role == Role::Staff)
        .map(|e| e.id.clone())
        .ok_or("no staff account")?;
    session.sign_in(&staff_id)?;

    let backpack = session
        .catalog()
        .get_by_sku("OUT-001")
        .map(|p| p.id.clone())
        .ok_or("missing seed product")?;
    let tee = session
        .catalog()
        .get_by_sku("TEE-001")
        .map(|p| p.id.clone())
        .ok_or("missing seed product")?;

    session.add_to_cart(&backpack, 1)?;
    session.add_to_cart(&tee, 2)?;

    let totals = session.totals(Fulfillment::Delivery, None);
    println!();
    println!("Cart (delivery):");
    println!("    Subtotal   {:>8}", totals.subtotal);
    println!("    Discounts  {:>8}", totals.discount_total);
    println!("    Shipping   {:>8}", totals.shipping);
    println!("    Tax        {:>8}", totals.tax);
    println!("    Total      {:>8}", totals.grand_total);

    let sale_id = session
        .checkout(
            Customer {
                name: "Walk-in".to_string(),
                ..Customer::default()
            },
            Tender::Card,
            Fulfillment::Delivery,
            None,
        )?
        .id
        .clone();
    println!();
    println!("✓ Sale {} recorded", sale_id);

    // Management actions need the admin account
    let admin_id = session
        .employees()
        .iter()
        .find(|e| e.role == Role::Admin)
        .map(|e| e.id.clone())
        .ok_or("no admin account")?;
    session.sign_in(&admin_id)?;

    session.refund_sale(&sale_id, "24.99", "one tee returned", true)?;
    let sale = session.find_sale(&sale_id).ok_or("sale vanished")?;
    println!("✓ Refunded: status {:?}", sale.status);

    // Snapshot survives a restart
    let mut backend = MemoryStorage::new();
    session.snapshot().save(&mut backend)?;
    let restored = Snapshot::load(&backend)?;
    println!();
    println!(
        "✓ Snapshot round trip: {} products, {} sales",
        restored.products.len(),
        restored.sales.len()
    );

    println!();
    println!("✓ Walkthrough complete");
    Ok(())
}
