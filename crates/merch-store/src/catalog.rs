//! # Product Catalog
//!
//! In-memory catalog of products with validated writes and simple search.
//!
//! ## Key Operations
//! - Substring search across SKU and name
//! - CRUD with SKU uniqueness checks
//! - Stock adjustments (owns the [`Inventory`] implementation)
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Catalog Search Works                             │
//! │                                                                         │
//! │  User types: "hood"                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Case-insensitive substring match across: sku, name                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │ HD-001   | Logo Hoodie   | 39.99        │ ← MATCH!                  │
//! │  │ TEE-001  | Graphic Tee   | 24.99        │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Optional category filter intersects the result                        │
//! │                                                                         │
//! │  Scale: a few hundred products. Linear scan is plenty.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use merch_core::validation::{
    validate_price_cents, validate_product_name, validate_sku, validate_stock,
};
use merch_core::{Inventory, Product};
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// Stock at or below this count is flagged as "low" in listings.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// In-memory product catalog.
///
/// ## Usage
/// ```rust
/// use merch_store::catalog::Catalog;
///
/// let catalog = Catalog::with_sample_products();
/// let results = catalog.search("hoodie", None);
/// assert_eq!(results.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Catalog {
            products: Vec::new(),
        }
    }

    /// Creates a catalog from an existing product list (snapshot restore).
    pub fn from_products(products: Vec<Product>) -> Self {
        Catalog { products }
    }

    /// Creates a catalog pre-loaded with the demo merchandise line.
    ///
    /// Used when the store starts with no saved snapshot, so the till is
    /// never an empty grid on first launch.
    pub fn with_sample_products() -> Self {
        Catalog {
            products: sample_products(),
        }
    }

    /// Returns all products in insertion order.
    pub fn list(&self) -> &[Product] {
        &self.products
    }

    /// Returns the number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Checks whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Looks up a product by ID.
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Looks up a product by SKU (case-sensitive, SKUs are canonical).
    pub fn get_by_sku(&self, sku: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.sku == sku)
    }

    /// Returns the distinct categories, sorted, for filter chips.
    pub fn categories(&self) -> Vec<String> {
        let mut cats: Vec<String> = self
            .products
            .iter()
            .map(|p| p.category.clone())
            .collect();
        cats.sort();
        cats.dedup();
        cats
    }

    /// Searches products by substring across SKU and name.
    ///
    /// ## Behavior
    /// - Empty query matches everything
    /// - Matching is case-insensitive
    /// - `category` (if given) must match exactly
    pub fn search(&self, query: &str, category: Option<&str>) -> Vec<&Product> {
        let needle = query.trim().to_lowercase();

        debug!(query = %needle, category = ?category, "Searching catalog");

        self.products
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || p.name.to_lowercase().contains(&needle)
                    || p.sku.to_lowercase().contains(&needle)
            })
            .filter(|p| category.map_or(true, |c| p.category == c))
            .collect()
    }

    /// Returns products at or below the low-stock threshold.
    pub fn low_stock(&self) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.stock <= LOW_STOCK_THRESHOLD)
            .collect()
    }

    /// Inserts or updates a product.
    ///
    /// ## Behavior
    /// - Empty `id` means "new": a UUID is assigned
    /// - Existing `id` replaces that product in place
    /// - The SKU must not belong to a *different* product
    ///
    /// ## Returns
    /// The saved product's ID.
    pub fn upsert(&mut self, mut product: Product) -> StoreResult<String> {
        validate_sku(&product.sku).map_err(merch_core::CoreError::from)?;
        validate_product_name(&product.name).map_err(merch_core::CoreError::from)?;
        validate_price_cents(product.price_cents).map_err(merch_core::CoreError::from)?;
        validate_stock(product.stock).map_err(merch_core::CoreError::from)?;

        if let Some(other) = self.get_by_sku(&product.sku) {
            if other.id != product.id {
                return Err(StoreError::duplicate("sku", &product.sku));
            }
        }

        if product.id.is_empty() {
            product.id = Uuid::new_v4().to_string();
        }

        let id = product.id.clone();
        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(slot) => *slot = product,
            None => self.products.push(product),
        }

        Ok(id)
    }

    /// Removes a product by ID.
    pub fn delete(&mut self, id: &str) -> StoreResult<()> {
        let before = self.products.len();
        self.products.retain(|p| p.id != id);

        if self.products.len() == before {
            Err(StoreError::not_found("Product", id))
        } else {
            Ok(())
        }
    }

    /// Replaces the entire product list (snapshot restore).
    pub fn replace_all(&mut self, products: Vec<Product>) {
        self.products = products;
    }
}

impl Inventory for Catalog {
    fn get_product(&self, id: &str) -> Option<Product> {
        self.get(id).cloned()
    }

    /// Applies a stock delta, flooring at zero.
    ///
    /// Oversold stock clamps rather than going negative; the register
    /// keeps selling even when counts drift.
    fn adjust_stock(&mut self, id: &str, delta: i64) {
        if let Some(product) = self.products.iter_mut().find(|p| p.id == id) {
            product.stock = (product.stock + delta).max(0);
        }
    }
}

/// The demo merchandise line seeded on first launch.
fn sample_products() -> Vec<Product> {
    let make = |sku: &str, name: &str, category: &str, price_cents: i64, stock: i64| Product {
        id: Uuid::new_v4().to_string(),
        sku: sku.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        price_cents,
        stock,
    };

    vec![
        make("OUT-001", "Outdoor Backpack", "Outdoor", 4999, 12),
        make("HAT-001", "Caleb Hat", "Hats", 1999, 30),
        make("HD-001", "Logo Hoodie", "Hoodies & Sweatshirts", 3999, 18),
        make("TEE-001", "Graphic Tee", "T-Shirts", 2499, 40),
        make("BABY-001", "Baby Onesie", "Baby & Toddler", 1499, 20),
        make("MUG-001", "Caleb Mug", "Kitchenwear", 1299, 25),
        make("STK-001", "Sticker Pack", "Accessories", 499, 250),
    ]
}
