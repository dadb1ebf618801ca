//! Fixtures
//!
//! YAML seed data for storefront sessions. A seed file defines the
//! catalog and coupon book used the first time a store is opened,
//! before anything has been persisted.

use std::fs;
use std::path::Path;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::KRW};
use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::coupons::{Coupon, CouponBenefit, CouponBook};
use crate::products::{Catalog, DiscountTier, Product, ProductId};
use crate::storefront::Seed;
use crate::validation;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading a fixture file
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),
    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),
    /// Invalid price value
    #[error("Invalid price: {0}")]
    InvalidPrice(i64),
    /// Invalid stock value
    #[error("Invalid stock: {0}")]
    InvalidStock(i64),
    /// Invalid discount tier
    #[error("Invalid discount tier: {0}+ at {1}")]
    InvalidTier(u32, f64),
    /// Invalid coupon definition
    #[error("Invalid coupon: {0}")]
    InvalidCoupon(String),
}

/// A seed data set as written in YAML.
#[derive(Debug, Deserialize)]
pub struct SeedFixture {
    /// Products in catalog order.
    pub products: Vec<ProductFixture>,
    /// Coupons in registry order.
    #[serde(default)]
    pub coupons: Vec<CouponFixture>,
}

/// A product definition as written in YAML.
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Display name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Unit price in won.
    pub price: i64,
    /// Units available for sale.
    pub stock: i64,
    /// Discount tiers.
    #[serde(default)]
    pub discounts: Vec<TierFixture>,
}

/// A discount tier as written in YAML.
#[derive(Debug, Deserialize)]
pub struct TierFixture {
    /// Quantity threshold.
    pub quantity: u32,
    /// Fractional rate.
    pub rate: f64,
}

/// A coupon definition as written in YAML.
#[derive(Debug, Deserialize)]
pub struct CouponFixture {
    /// Display name.
    pub name: String,
    /// Registry-unique code.
    pub code: String,
    /// Either `amount` or `percentage`.
    pub discount_type: String,
    /// Minor units or whole percentage points, depending on the type.
    pub discount_value: i64,
}

impl TryFrom<ProductFixture> for Product {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        if !validation::is_valid_price(fixture.price) {
            return Err(FixtureError::InvalidPrice(fixture.price));
        }
        if !validation::is_valid_stock_range(fixture.stock, validation::MAX_STOCK) {
            return Err(FixtureError::InvalidStock(fixture.stock));
        }
        let stock = u32::try_from(fixture.stock)
            .map_err(|_err| FixtureError::InvalidStock(fixture.stock))?;

        let discounts = fixture
            .discounts
            .into_iter()
            .map(|tier| {
                if tier.quantity == 0 || !(0.0..=1.0).contains(&tier.rate) {
                    return Err(FixtureError::InvalidTier(tier.quantity, tier.rate));
                }
                Ok(DiscountTier::new(tier.quantity, Percentage::from(tier.rate)))
            })
            .collect::<Result<SmallVec<[DiscountTier; 2]>, _>>()?;

        Ok(Self {
            id: ProductId::generate(),
            name: fixture.name,
            description: fixture.description,
            price: Money::from_minor(fixture.price, KRW),
            stock,
            discounts,
        })
    }
}

impl TryFrom<CouponFixture> for Coupon {
    type Error = FixtureError;

    fn try_from(fixture: CouponFixture) -> Result<Self, Self::Error> {
        if !validation::is_valid_coupon_code(&fixture.code) {
            return Err(FixtureError::InvalidCoupon(fixture.code));
        }
        let benefit = match fixture.discount_type.as_str() {
            "amount" => {
                if !validation::is_valid_discount_amount(
                    fixture.discount_value,
                    validation::MAX_DISCOUNT_AMOUNT,
                ) {
                    return Err(FixtureError::InvalidCoupon(fixture.code));
                }
                CouponBenefit::AmountOff(Money::from_minor(fixture.discount_value, KRW))
            }
            "percentage" => {
                if !validation::is_valid_discount_rate(fixture.discount_value) {
                    return Err(FixtureError::InvalidCoupon(fixture.code));
                }
                CouponBenefit::PercentOff(Percentage::from(Decimal::new(fixture.discount_value, 2)))
            }
            _other => return Err(FixtureError::InvalidCoupon(fixture.code)),
        };

        Ok(Self {
            name: fixture.name,
            code: fixture.code,
            benefit,
        })
    }
}

/// Parse a seed data set from YAML text.
///
/// # Errors
///
/// Returns a [`FixtureError`] if the YAML is malformed or a definition
/// fails validation.
pub fn seed_from_str(yaml: &str) -> Result<Seed, FixtureError> {
    let fixture: SeedFixture = serde_norway::from_str(yaml)?;

    let products = fixture
        .products
        .into_iter()
        .map(Product::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let coupons = fixture
        .coupons
        .into_iter()
        .map(Coupon::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Seed {
        catalog: Catalog::with_products(products),
        coupons: CouponBook::with_coupons(coupons),
    })
}

/// Load a seed data set from a YAML file.
///
/// # Errors
///
/// Returns a [`FixtureError`] if the file cannot be read or parsed.
pub fn load_seed(path: impl AsRef<Path>) -> Result<Seed, FixtureError> {
    let contents = fs::read_to_string(path)?;
    seed_from_str(&contents)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    const SEED_YAML: &str = r"
products:
  - name: Wireless Mouse
    description: Compact 2.4GHz mouse
    price: 10000
    stock: 20
    discounts:
      - quantity: 10
        rate: 0.1
  - name: Mechanical Keyboard
    price: 20000
    stock: 5
coupons:
  - name: 5,000 won off
    code: WELCOME5000
    discount_type: amount
    discount_value: 5000
  - name: 10% off
    code: PERCENT10
    discount_type: percentage
    discount_value: 10
";

    #[test]
    fn seeds_parse_products_and_coupons() -> TestResult {
        let seed = seed_from_str(SEED_YAML)?;

        assert_eq!(seed.catalog.len(), 2);
        assert_eq!(seed.coupons.len(), 2);

        let mouse = seed
            .catalog
            .iter()
            .find(|product| product.name == "Wireless Mouse")
            .ok_or("mouse should be present")?;
        assert_eq!(mouse.price, Money::from_minor(10_000, KRW));
        assert_eq!(mouse.stock, 20);
        assert_eq!(mouse.discounts.len(), 1);

        assert!(seed.coupons.contains("WELCOME5000"));
        assert!(seed.coupons.contains("PERCENT10"));
        Ok(())
    }

    #[test]
    fn generated_ids_are_distinct() -> TestResult {
        let seed = seed_from_str(SEED_YAML)?;

        let ids: Vec<&str> = seed.catalog.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids.first(), ids.last());
        Ok(())
    }

    #[test]
    fn invalid_prices_are_rejected() {
        let yaml = r"
products:
  - name: Freebie
    price: 0
    stock: 1
";

        let result = seed_from_str(yaml);

        assert!(matches!(result, Err(FixtureError::InvalidPrice(0))));
    }

    #[test]
    fn invalid_tiers_are_rejected() {
        let yaml = r"
products:
  - name: Generous
    price: 1000
    stock: 1
    discounts:
      - quantity: 10
        rate: 1.5
";

        let result = seed_from_str(yaml);

        assert!(matches!(result, Err(FixtureError::InvalidTier(10, _))));
    }

    #[test]
    fn invalid_coupon_codes_are_rejected() {
        let yaml = r"
products: []
coupons:
  - name: Bad
    code: bad
    discount_type: amount
    discount_value: 100
";

        let result = seed_from_str(yaml);

        assert!(matches!(result, Err(FixtureError::InvalidCoupon(code)) if code == "bad"));
    }

    #[test]
    fn missing_files_surface_as_io_errors() {
        let result = load_seed("does/not/exist.yml");

        assert!(matches!(result, Err(FixtureError::Io(_))));
    }

    #[test]
    fn the_bundled_seed_file_parses() -> TestResult {
        let seed = load_seed("fixtures/seed.yml")?;

        assert!(!seed.catalog.is_empty());
        assert!(!seed.coupons.is_empty());
        Ok(())
    }
}
