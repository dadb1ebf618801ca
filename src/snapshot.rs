//! Snapshots
//!
//! Wire records for the three persisted collections. Payloads are JSON
//! arrays with camelCase field names; loading validates every record
//! before it becomes a domain value, so a tampered snapshot is rejected
//! rather than half-applied.

use decimal_percentage::Percentage;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso::KRW};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::cart::{Cart, CartLine};
use crate::coupons::{Coupon, CouponBenefit, CouponBook};
use crate::products::{Catalog, DiscountTier, Product, ProductId};
use crate::validation;

/// Storage key for the persisted cart lines.
pub const CART_KEY: &str = "cart";

/// Storage key for the persisted product catalog.
pub const PRODUCTS_KEY: &str = "products";

/// Storage key for the persisted coupon registry.
pub const COUPONS_KEY: &str = "coupons";

/// Snapshot Decoding Errors
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// JSON parse or serialize failure
    #[error("Failed to decode snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A product carried a non-positive price
    #[error("Invalid product price: {0}")]
    InvalidPrice(i64),
    /// A product carried an out-of-range stock count
    #[error("Invalid stock count: {0}")]
    InvalidStock(i64),
    /// A discount tier carried a zero threshold
    #[error("Invalid discount tier quantity: {0}")]
    InvalidTierQuantity(u32),
    /// A discount tier carried a rate outside zero to one
    #[error("Invalid discount rate: {0}")]
    InvalidRate(f64),
    /// A coupon carried a malformed code
    #[error("Invalid coupon code: {0}")]
    InvalidCouponCode(String),
    /// A coupon carried an unknown discount type
    #[error("Unknown coupon discount type: {0}")]
    UnknownDiscountType(String),
    /// A coupon carried an out-of-range discount value
    #[error("Invalid coupon discount value: {0}")]
    InvalidDiscountValue(i64),
    /// A cart line carried a non-positive quantity
    #[error("Invalid cart line quantity: {0}")]
    InvalidQuantity(i64),
}

/// Wire record for a discount tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierRecord {
    /// Quantity threshold at which the tier applies.
    pub quantity: u32,
    /// Fractional rate, e.g. `0.1` for ten percent.
    pub rate: f64,
}

/// Wire record for a catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Persistent product id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-text description, omitted when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Unit price in minor units.
    pub price: i64,
    /// Units available for sale.
    pub stock: i64,
    /// Discount tiers, in order.
    #[serde(default)]
    pub discounts: Vec<TierRecord>,
}

/// Wire record for a coupon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponRecord {
    /// Display name.
    pub name: String,
    /// Registry-unique code.
    pub code: String,
    /// Either `amount` or `percentage`.
    pub discount_type: String,
    /// Minor units for amount coupons, whole percentage points for
    /// percentage coupons.
    pub discount_value: i64,
}

/// Wire record for a cart line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRecord {
    /// Product snapshot held by the line.
    pub product: ProductRecord,
    /// Units in the cart.
    pub quantity: i64,
}

impl TryFrom<TierRecord> for DiscountTier {
    type Error = SnapshotError;

    fn try_from(record: TierRecord) -> Result<Self, Self::Error> {
        if record.quantity == 0 {
            return Err(SnapshotError::InvalidTierQuantity(record.quantity));
        }
        if !(0.0..=1.0).contains(&record.rate) {
            return Err(SnapshotError::InvalidRate(record.rate));
        }
        Ok(Self::new(record.quantity, Percentage::from(record.rate)))
    }
}

impl From<&DiscountTier> for TierRecord {
    fn from(tier: &DiscountTier) -> Self {
        Self {
            quantity: tier.quantity(),
            rate: (tier.rate() * Decimal::ONE).to_f64().unwrap_or(0.0),
        }
    }
}

impl TryFrom<ProductRecord> for Product {
    type Error = SnapshotError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        if !validation::is_valid_price(record.price) {
            return Err(SnapshotError::InvalidPrice(record.price));
        }
        if !validation::is_valid_stock_range(record.stock, validation::MAX_STOCK) {
            return Err(SnapshotError::InvalidStock(record.stock));
        }
        let stock = u32::try_from(record.stock)
            .map_err(|_err| SnapshotError::InvalidStock(record.stock))?;
        let discounts = record
            .discounts
            .into_iter()
            .map(DiscountTier::try_from)
            .collect::<Result<SmallVec<[DiscountTier; 2]>, _>>()?;

        Ok(Self {
            id: ProductId::from(record.id),
            name: record.name,
            description: record.description,
            price: Money::from_minor(record.price, KRW),
            stock,
            discounts,
        })
    }
}

impl From<&Product> for ProductRecord {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_str().to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_minor_units(),
            stock: i64::from(product.stock),
            discounts: product.discounts.iter().map(TierRecord::from).collect(),
        }
    }
}

impl TryFrom<CouponRecord> for Coupon {
    type Error = SnapshotError;

    fn try_from(record: CouponRecord) -> Result<Self, Self::Error> {
        if !validation::is_valid_coupon_code(&record.code) {
            return Err(SnapshotError::InvalidCouponCode(record.code));
        }
        let benefit = match record.discount_type.as_str() {
            "amount" => {
                if !validation::is_valid_discount_amount(
                    record.discount_value,
                    validation::MAX_DISCOUNT_AMOUNT,
                ) {
                    return Err(SnapshotError::InvalidDiscountValue(record.discount_value));
                }
                CouponBenefit::AmountOff(Money::from_minor(record.discount_value, KRW))
            }
            "percentage" => {
                if !validation::is_valid_discount_rate(record.discount_value) {
                    return Err(SnapshotError::InvalidDiscountValue(record.discount_value));
                }
                CouponBenefit::PercentOff(Percentage::from(Decimal::new(record.discount_value, 2)))
            }
            other => return Err(SnapshotError::UnknownDiscountType(other.to_string())),
        };

        Ok(Self {
            name: record.name,
            code: record.code,
            benefit,
        })
    }
}

impl From<&Coupon> for CouponRecord {
    fn from(coupon: &Coupon) -> Self {
        let (discount_type, discount_value) = match coupon.benefit {
            CouponBenefit::AmountOff(amount) => ("amount", amount.to_minor_units()),
            CouponBenefit::PercentOff(percent) => {
                let points = (percent * Decimal::ONE_HUNDRED)
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    .to_i64()
                    .unwrap_or(0);
                ("percentage", points)
            }
        };
        Self {
            name: coupon.name.clone(),
            code: coupon.code.clone(),
            discount_type: discount_type.to_string(),
            discount_value,
        }
    }
}

impl TryFrom<CartLineRecord> for CartLine {
    type Error = SnapshotError;

    fn try_from(record: CartLineRecord) -> Result<Self, Self::Error> {
        let product = Product::try_from(record.product)?;
        // Stock gates ran against the live catalog when the line was
        // mutated; the snapshot only guarantees a positive count.
        if record.quantity < 1 {
            return Err(SnapshotError::InvalidQuantity(record.quantity));
        }
        let quantity = u32::try_from(record.quantity)
            .map_err(|_err| SnapshotError::InvalidQuantity(record.quantity))?;

        Ok(Self { product, quantity })
    }
}

impl From<&CartLine> for CartLineRecord {
    fn from(line: &CartLine) -> Self {
        Self {
            product: ProductRecord::from(&line.product),
            quantity: i64::from(line.quantity),
        }
    }
}

/// Serialize a catalog to its JSON array payload.
///
/// # Errors
///
/// Returns a [`SnapshotError`] if serialization fails.
pub fn products_to_json(catalog: &Catalog) -> Result<String, SnapshotError> {
    let records: Vec<ProductRecord> = catalog.iter().map(ProductRecord::from).collect();
    Ok(serde_json::to_string(&records)?)
}

/// Parse a catalog from its JSON array payload.
///
/// # Errors
///
/// Returns a [`SnapshotError`] if the JSON is malformed or any record
/// fails validation.
pub fn products_from_json(json: &str) -> Result<Catalog, SnapshotError> {
    let records: Vec<ProductRecord> = serde_json::from_str(json)?;
    let products = records
        .into_iter()
        .map(Product::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Catalog::with_products(products))
}

/// Serialize a coupon registry to its JSON array payload.
///
/// # Errors
///
/// Returns a [`SnapshotError`] if serialization fails.
pub fn coupons_to_json(book: &CouponBook) -> Result<String, SnapshotError> {
    let records: Vec<CouponRecord> = book.iter().map(CouponRecord::from).collect();
    Ok(serde_json::to_string(&records)?)
}

/// Parse a coupon registry from its JSON array payload.
///
/// # Errors
///
/// Returns a [`SnapshotError`] if the JSON is malformed or any record
/// fails validation.
pub fn coupons_from_json(json: &str) -> Result<CouponBook, SnapshotError> {
    let records: Vec<CouponRecord> = serde_json::from_str(json)?;
    let coupons = records
        .into_iter()
        .map(Coupon::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CouponBook::with_coupons(coupons))
}

/// Serialize a cart to its JSON array payload.
///
/// # Errors
///
/// Returns a [`SnapshotError`] if serialization fails.
pub fn cart_to_json(cart: &Cart) -> Result<String, SnapshotError> {
    let records: Vec<CartLineRecord> = cart.iter().map(CartLineRecord::from).collect();
    Ok(serde_json::to_string(&records)?)
}

/// Parse a cart from its JSON array payload.
///
/// # Errors
///
/// Returns a [`SnapshotError`] if the JSON is malformed or any record
/// fails validation.
pub fn cart_from_json(json: &str) -> Result<Cart, SnapshotError> {
    let records: Vec<CartLineRecord> = serde_json::from_str(json)?;
    let lines = records
        .into_iter()
        .map(CartLine::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Cart::with_lines(lines))
}
