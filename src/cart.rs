//! Cart
//!
//! The shopping cart and its stock-gated mutations. A [`Cart`] is an
//! immutable value: every operation returns a new cart and leaves the
//! input untouched, and a rejected operation returns the original state
//! with nothing partially applied.
//!
//! Lines snapshot the product at the time it entered the cart. Stock
//! gates always consult the catalog product passed in, so an
//! administrator raising or lowering stock takes effect on the next
//! mutation.

use thiserror::Error;

use crate::discounts::BULK_TRIGGER_QUANTITY;
use crate::products::{Product, ProductId};

/// One product and quantity pair in a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// Product snapshot taken when the line was created.
    pub product: Product,
    /// Number of units in the cart, always at least one.
    pub quantity: u32,
}

/// Rejections raised by cart mutations.
///
/// A denial leaves the cart exactly as it was.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartDenial {
    /// No remaining stock to add another unit.
    #[error("Insufficient stock!")]
    InsufficientStock,
    /// The requested quantity exceeds the available stock.
    #[error("Only {0} in stock.")]
    StockLimit(u32),
}

/// The shopping cart, ordered by insertion and unique by product id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cart from existing lines. Callers are expected to
    /// supply lines with distinct product ids and positive quantities;
    /// snapshot loading validates records before reaching this
    /// constructor.
    #[must_use]
    pub fn with_lines(lines: impl Into<Vec<CartLine>>) -> Self {
        Self {
            lines: lines.into(),
        }
    }

    /// Add one unit of `product`, creating a line or incrementing an
    /// existing one.
    ///
    /// # Errors
    ///
    /// Returns [`CartDenial::InsufficientStock`] when no stock remains
    /// for `product` given what the cart already holds, and
    /// [`CartDenial::StockLimit`] when incrementing would push the line
    /// past the product's stock.
    pub fn add(&self, product: &Product) -> Result<Self, CartDenial> {
        if self.remaining_stock(product) <= 0 {
            return Err(CartDenial::InsufficientStock);
        }

        let mut lines = self.lines.clone();
        if let Some(line) = lines.iter_mut().find(|line| line.product.id == product.id) {
            let incremented = line.quantity + 1;
            if incremented > product.stock {
                return Err(CartDenial::StockLimit(product.stock));
            }
            line.quantity = incremented;
        } else {
            lines.push(CartLine {
                product: product.clone(),
                quantity: 1,
            });
        }
        Ok(Self { lines })
    }

    /// Remove the line for `id`. Unknown ids are a no-op.
    #[must_use]
    pub fn remove(&self, id: &ProductId) -> Self {
        let lines = self
            .lines
            .iter()
            .filter(|line| line.product.id != *id)
            .cloned()
            .collect();
        Self { lines }
    }

    /// Set the quantity of the line for `id`.
    ///
    /// A quantity of zero removes the line. Unknown ids leave the cart
    /// unchanged and succeed.
    ///
    /// # Errors
    ///
    /// Returns [`CartDenial::StockLimit`] when `new_quantity` exceeds
    /// `max_stock`. The cart is unchanged in that case.
    pub fn with_quantity(
        &self,
        id: &ProductId,
        new_quantity: u32,
        max_stock: u32,
    ) -> Result<Self, CartDenial> {
        if new_quantity == 0 {
            return Ok(self.remove(id));
        }
        if new_quantity > max_stock {
            return Err(CartDenial::StockLimit(max_stock));
        }

        let mut lines = self.lines.clone();
        if let Some(line) = lines.iter_mut().find(|line| line.product.id == *id) {
            line.quantity = new_quantity;
        }
        Ok(Self { lines })
    }

    /// Units of `product` still available given what the cart holds.
    ///
    /// Negative values mean the cart holds more than the product's
    /// current stock, which can happen after an administrator lowers
    /// it.
    #[must_use]
    pub fn remaining_stock(&self, product: &Product) -> i64 {
        let in_cart = self
            .line_for(&product.id)
            .map_or(0, |line| line.quantity);
        i64::from(product.stock) - i64::from(in_cart)
    }

    /// Whether any line has reached [`BULK_TRIGGER_QUANTITY`], which
    /// unlocks the cart-wide bulk bonus.
    #[must_use]
    pub fn bulk_discount_unlocked(&self) -> bool {
        self.lines
            .iter()
            .any(|line| line.quantity >= BULK_TRIGGER_QUANTITY)
    }

    /// The line for `id`, if the cart holds one.
    #[must_use]
    pub fn line_for(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id == *id)
    }

    /// Iterate over the lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across every line.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}
