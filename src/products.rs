//! Products
//!
//! The catalog and its product records. A [`Catalog`] is an immutable
//! value: administrative operations return a new catalog and leave the
//! input untouched, so earlier snapshots stay valid.

use std::fmt;

use decimal_percentage::Percentage;
use smallvec::SmallVec;
use uuid::Uuid;

use crate::pricing::Amount;

/// Unique product identifier.
///
/// Ids are opaque strings generated when a product enters the catalog.
/// They never change afterwards, survive snapshots, and are the sole key
/// used to match cart lines against catalog entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductId(String);

impl ProductId {
    /// Generate a fresh id.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("p-{}", Uuid::new_v4().simple()))
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A quantity-threshold discount attached to a product.
///
/// A tier becomes applicable to a cart line once the line quantity
/// reaches the tier's threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountTier {
    quantity: u32,
    rate: Percentage,
}

impl DiscountTier {
    /// Create a tier that applies `rate` at `quantity` units or more.
    #[must_use]
    pub fn new(quantity: u32, rate: Percentage) -> Self {
        Self { quantity, rate }
    }

    /// The minimum line quantity for this tier to apply.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// The fractional discount rate granted by this tier.
    #[must_use]
    pub fn rate(&self) -> Percentage {
        self.rate
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Unique id, immutable once assigned.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Free-text description, searchable alongside the name. Empty when
    /// the product has none.
    pub description: String,
    /// Unit price.
    pub price: Amount,
    /// Units available for sale.
    pub stock: u32,
    /// Quantity-threshold discounts, in insertion order.
    pub discounts: SmallVec<[DiscountTier; 2]>,
}

/// A product definition without an id, consumed by [`Catalog::add`].
#[derive(Debug, Clone)]
pub struct NewProduct {
    /// Display name.
    pub name: String,
    /// Free-text description; empty for none.
    pub description: String,
    /// Unit price.
    pub price: Amount,
    /// Units available for sale.
    pub stock: u32,
    /// Quantity-threshold discounts.
    pub discounts: SmallVec<[DiscountTier; 2]>,
}

/// A partial product update merged by [`Catalog::update`].
///
/// `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement unit price.
    pub price: Option<Amount>,
    /// Replacement stock count.
    pub stock: Option<u32>,
    /// Replacement discount tiers.
    pub discounts: Option<SmallVec<[DiscountTier; 2]>>,
}

/// The product catalog, ordered by insertion and unique by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog from existing products. Callers are expected to
    /// supply products with distinct ids; snapshot loading validates
    /// records before reaching this constructor.
    #[must_use]
    pub fn with_products(products: impl Into<Vec<Product>>) -> Self {
        Self {
            products: products.into(),
        }
    }

    /// Add a product under a freshly generated id.
    ///
    /// Returns the new catalog together with the stored product.
    #[must_use]
    pub fn add(&self, new: NewProduct) -> (Self, Product) {
        let product = Product {
            id: ProductId::generate(),
            name: new.name,
            description: new.description,
            price: new.price,
            stock: new.stock,
            discounts: new.discounts,
        };
        let mut products = self.products.clone();
        products.push(product.clone());
        (Self { products }, product)
    }

    /// Merge `patch` into the product with `id`.
    ///
    /// Unknown ids leave the catalog unchanged. The id itself is never
    /// rewritten.
    #[must_use]
    pub fn update(&self, id: &ProductId, patch: ProductPatch) -> Self {
        let mut products = self.products.clone();
        if let Some(product) = products.iter_mut().find(|product| product.id == *id) {
            if let Some(name) = patch.name {
                product.name = name;
            }
            if let Some(description) = patch.description {
                product.description = description;
            }
            if let Some(price) = patch.price {
                product.price = price;
            }
            if let Some(stock) = patch.stock {
                product.stock = stock;
            }
            if let Some(discounts) = patch.discounts {
                product.discounts = discounts;
            }
        }
        Self { products }
    }

    /// Remove the product with `id`. Unknown ids are a no-op.
    #[must_use]
    pub fn remove(&self, id: &ProductId) -> Self {
        let products = self
            .products
            .iter()
            .filter(|product| product.id != *id)
            .cloned()
            .collect();
        Self { products }
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == *id)
    }

    /// Products whose name or description contains `query`,
    /// case-insensitively. An empty query matches every product.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Product> {
        if query.is_empty() {
            return self.products.iter().collect();
        }
        let needle = query.to_lowercase();
        self.products
            .iter()
            .filter(|product| {
                product.name.to_lowercase().contains(&needle)
                    || product.description.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Iterate over the products in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog holds no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
