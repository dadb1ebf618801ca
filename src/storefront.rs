//! Storefront
//!
//! The session facade tying the pure models to their collaborators.
//! Each operation reads the current state, computes a replacement
//! through the cart, catalog and coupon values, persists the touched
//! collection, then reports the outcome as a notice.
//!
//! Business rejections are not errors at this layer: a denied operation
//! leaves every collection untouched and surfaces as an error severity
//! notice. The `Result` returns carry only infrastructure failures,
//! storage and snapshot codec ones.

use std::time::{SystemTime, UNIX_EPOCH};

use rust_decimal::Decimal;
use thiserror::Error;

use crate::cart::Cart;
use crate::coupons::{self, Coupon, CouponBenefit, CouponBook};
use crate::notices::{NoticeHub, Severity};
use crate::pricing::{Amount, CartTotals, PricingError, cart_totals};
use crate::products::{Catalog, DiscountTier, NewProduct, Product, ProductId, ProductPatch};
use crate::snapshot::{
    CART_KEY, COUPONS_KEY, PRODUCTS_KEY, SnapshotError, cart_from_json, cart_to_json,
    coupons_from_json, coupons_to_json, products_from_json, products_to_json,
};
use crate::store::{KvStore, StoreError};
use crate::validation;

/// Storefront Session Errors
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Snapshot storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Snapshot codec failure
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    /// Totals could not be computed
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Initial catalog and coupons for stores holding no persisted state.
#[derive(Debug, Clone, Default)]
pub struct Seed {
    /// Catalog used when no product snapshot exists.
    pub catalog: Catalog,
    /// Coupon book used when no coupon snapshot exists.
    pub coupons: CouponBook,
}

/// A storefront session over a snapshot store.
#[derive(Debug)]
pub struct Storefront<S> {
    store: S,
    notices: NoticeHub,
    catalog: Catalog,
    cart: Cart,
    coupons: CouponBook,
    active_coupon: Option<Coupon>,
}

impl<S: KvStore> Storefront<S> {
    /// Open a session, restoring each collection from `store` and
    /// falling back to `seed` for collections never persisted.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError`] if the store cannot be read or a
    /// persisted snapshot fails to decode.
    pub fn open(store: S, seed: Seed) -> Result<Self, StorefrontError> {
        let catalog = match store.get(PRODUCTS_KEY)? {
            Some(json) => products_from_json(&json)?,
            None => seed.catalog,
        };
        let coupons = match store.get(COUPONS_KEY)? {
            Some(json) => coupons_from_json(&json)?,
            None => seed.coupons,
        };
        let cart = match store.get(CART_KEY)? {
            Some(json) => cart_from_json(&json)?,
            None => Cart::new(),
        };

        Ok(Self {
            store,
            notices: NoticeHub::new(),
            catalog,
            cart,
            coupons,
            active_coupon: None,
        })
    }

    /// Add one unit of the product with `product_id` to the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError`] if persisting the cart fails.
    pub fn add_to_cart(&mut self, product_id: &ProductId) -> Result<(), StorefrontError> {
        let Some(product) = self.catalog.get(product_id).cloned() else {
            self.notices.push("Product not found.", Severity::Error);
            return Ok(());
        };

        match self.cart.add(&product) {
            Ok(cart) => {
                self.cart = cart;
                self.persist_cart()?;
                self.notices.push("Added to cart.", Severity::Success);
            }
            Err(denial) => {
                self.notices.push(denial.to_string(), Severity::Error);
            }
        }
        Ok(())
    }

    /// Remove the cart line for `product_id`, silently ignoring ids the
    /// cart does not hold.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError`] if persisting the cart fails.
    pub fn remove_from_cart(&mut self, product_id: &ProductId) -> Result<(), StorefrontError> {
        self.cart = self.cart.remove(product_id);
        self.persist_cart()
    }

    /// Set the quantity of the cart line for `product_id`, silently
    /// ignoring ids the catalog does not hold. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError`] if persisting the cart fails.
    pub fn change_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), StorefrontError> {
        let Some(max_stock) = self.catalog.get(product_id).map(|product| product.stock) else {
            return Ok(());
        };

        match self.cart.with_quantity(product_id, quantity, max_stock) {
            Ok(cart) => {
                self.cart = cart;
                self.persist_cart()?;
            }
            Err(denial) => {
                self.notices.push(denial.to_string(), Severity::Error);
            }
        }
        Ok(())
    }

    /// Select the registered coupon with `code` as the active coupon.
    ///
    /// Percentage coupons are refused while the couponless payable
    /// total is below the minimum; the previous selection stays active
    /// in that case.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError`] if the couponless total cannot be
    /// computed.
    pub fn apply_coupon(&mut self, code: &str) -> Result<(), StorefrontError> {
        let Some(coupon) = self.coupons.get(code).cloned() else {
            self.notices.push("Coupon not found.", Severity::Error);
            return Ok(());
        };

        let couponless = cart_totals(&self.cart, None)?;
        match coupons::check_applicable(&coupon, couponless.total_after_discount) {
            Ok(()) => {
                self.active_coupon = Some(coupon);
                self.notices.push("Coupon applied.", Severity::Success);
            }
            Err(denial) => {
                self.notices.push(denial.to_string(), Severity::Error);
            }
        }
        Ok(())
    }

    /// Clear the active coupon selection. Always succeeds.
    pub fn clear_coupon(&mut self) {
        self.active_coupon = None;
    }

    /// The cart totals under the active coupon.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError`] if the totals cannot be computed.
    pub fn totals(&self) -> Result<CartTotals, StorefrontError> {
        Ok(cart_totals(&self.cart, self.active_coupon.as_ref())?)
    }

    /// Complete the purchase: issue an order number, then reset the
    /// cart and the active coupon.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError`] if persisting the emptied cart
    /// fails.
    pub fn checkout(&mut self) -> Result<String, StorefrontError> {
        let order_number = new_order_number();
        self.cart = Cart::new();
        self.active_coupon = None;
        self.persist_cart()?;
        self.notices.push(
            format!("Order complete. Order number: {order_number}"),
            Severity::Success,
        );
        Ok(order_number)
    }

    /// Products matching `query` by name or description.
    #[must_use]
    pub fn search_products(&self, query: &str) -> Vec<&Product> {
        self.catalog.search(query)
    }

    /// Units of `product` still available given the cart contents.
    #[must_use]
    pub fn remaining_stock(&self, product: &Product) -> i64 {
        self.cart.remaining_stock(product)
    }

    /// Register a new product under a generated id.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError`] if persisting the catalog fails.
    pub fn add_product(&mut self, new: NewProduct) -> Result<(), StorefrontError> {
        if let Some(message) =
            invalid_product_input(Some(new.price), Some(new.stock), Some(new.discounts.as_slice()))
        {
            self.notices.push(message, Severity::Error);
            return Ok(());
        }

        let (catalog, _product) = self.catalog.add(new);
        self.catalog = catalog;
        self.persist_catalog()?;
        self.notices.push("Product added.", Severity::Success);
        Ok(())
    }

    /// Merge `patch` into the product with `product_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError`] if persisting the catalog fails.
    pub fn update_product(
        &mut self,
        product_id: &ProductId,
        patch: ProductPatch,
    ) -> Result<(), StorefrontError> {
        if let Some(message) =
            invalid_product_input(patch.price, patch.stock, patch.discounts.as_deref())
        {
            self.notices.push(message, Severity::Error);
            return Ok(());
        }

        self.catalog = self.catalog.update(product_id, patch);
        self.persist_catalog()?;
        self.notices.push("Product updated.", Severity::Success);
        Ok(())
    }

    /// Remove the product with `product_id` from the catalog. Cart
    /// lines keep their snapshot of the product.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError`] if persisting the catalog fails.
    pub fn delete_product(&mut self, product_id: &ProductId) -> Result<(), StorefrontError> {
        self.catalog = self.catalog.remove(product_id);
        self.persist_catalog()?;
        self.notices.push("Product deleted.", Severity::Success);
        Ok(())
    }

    /// Register `coupon` in the coupon book.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError`] if persisting the coupon book
    /// fails.
    pub fn add_coupon(&mut self, coupon: Coupon) -> Result<(), StorefrontError> {
        if let Some(message) = invalid_coupon_input(&coupon) {
            self.notices.push(message, Severity::Error);
            return Ok(());
        }

        match self.coupons.add(coupon) {
            Ok(book) => {
                self.coupons = book;
                self.persist_coupons()?;
                self.notices.push("Coupon added.", Severity::Success);
            }
            Err(denial) => {
                self.notices.push(denial.to_string(), Severity::Error);
            }
        }
        Ok(())
    }

    /// Remove the coupon with `code` from the book. A removed coupon
    /// that was also the active selection is deselected.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError`] if persisting the coupon book
    /// fails.
    pub fn delete_coupon(&mut self, code: &str) -> Result<(), StorefrontError> {
        self.coupons = self.coupons.remove(code);
        if self
            .active_coupon
            .as_ref()
            .is_some_and(|active| active.code == code)
        {
            self.active_coupon = None;
        }
        self.persist_coupons()?;
        self.notices.push("Coupon deleted.", Severity::Success);
        Ok(())
    }

    /// The current catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The current cart.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The current coupon book.
    #[must_use]
    pub fn coupons(&self) -> &CouponBook {
        &self.coupons
    }

    /// The active coupon selection, if any.
    #[must_use]
    pub fn active_coupon(&self) -> Option<&Coupon> {
        self.active_coupon.as_ref()
    }

    /// The underlying snapshot store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Pending notices.
    #[must_use]
    pub fn notices(&self) -> &NoticeHub {
        &self.notices
    }

    /// Pending notices, mutably, for dismissal and draining.
    pub fn notices_mut(&mut self) -> &mut NoticeHub {
        &mut self.notices
    }

    fn persist_cart(&mut self) -> Result<(), StorefrontError> {
        if self.cart.is_empty() {
            self.store.remove(CART_KEY)?;
        } else {
            let json = cart_to_json(&self.cart)?;
            self.store.put(CART_KEY, &json)?;
        }
        Ok(())
    }

    fn persist_catalog(&mut self) -> Result<(), StorefrontError> {
        if self.catalog.is_empty() {
            self.store.remove(PRODUCTS_KEY)?;
        } else {
            let json = products_to_json(&self.catalog)?;
            self.store.put(PRODUCTS_KEY, &json)?;
        }
        Ok(())
    }

    fn persist_coupons(&mut self) -> Result<(), StorefrontError> {
        if self.coupons.is_empty() {
            self.store.remove(COUPONS_KEY)?;
        } else {
            let json = coupons_to_json(&self.coupons)?;
            self.store.put(COUPONS_KEY, &json)?;
        }
        Ok(())
    }
}

/// First failed validation message for the supplied product fields, or
/// `None` when everything is acceptable.
fn invalid_product_input(
    price: Option<Amount>,
    stock: Option<u32>,
    tiers: Option<&[DiscountTier]>,
) -> Option<String> {
    if let Some(price) = price {
        if !validation::is_valid_price(price.to_minor_units()) {
            return Some("Price must be greater than 0.".to_string());
        }
    }
    if let Some(stock) = stock {
        if !validation::is_valid_stock_range(i64::from(stock), validation::MAX_STOCK) {
            return Some(format!("Stock cannot exceed {}.", validation::MAX_STOCK));
        }
    }
    if let Some(tiers) = tiers {
        if tiers.iter().any(|tier| tier.quantity() == 0) {
            return Some("Discount quantity must be at least 1.".to_string());
        }
        let rate_out_of_range = tiers.iter().any(|tier| {
            let rate = tier.rate() * Decimal::ONE;
            !(Decimal::ZERO..=Decimal::ONE).contains(&rate)
        });
        if rate_out_of_range {
            return Some("Discount rate must be between 0% and 100%.".to_string());
        }
    }
    None
}

/// First failed validation message for a coupon, or `None` when it is
/// acceptable.
fn invalid_coupon_input(coupon: &Coupon) -> Option<String> {
    if !validation::is_valid_coupon_code(&coupon.code) {
        return Some("Coupon codes must be 4-12 uppercase letters and digits.".to_string());
    }
    match coupon.benefit {
        CouponBenefit::AmountOff(amount) => {
            if !validation::is_valid_discount_amount(
                amount.to_minor_units(),
                validation::MAX_DISCOUNT_AMOUNT,
            ) {
                return Some("Discount amount cannot exceed ₩100,000.".to_string());
            }
        }
        CouponBenefit::PercentOff(percent) => {
            let rate = percent * Decimal::ONE;
            if !(Decimal::ZERO..=Decimal::ONE).contains(&rate) {
                return Some("Discount rate must be between 0% and 100%.".to_string());
            }
        }
    }
    None
}

fn new_order_number() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis());
    format!("ORD-{millis}")
}
