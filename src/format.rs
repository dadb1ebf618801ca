//! Formatting
//!
//! Price labels for the two storefront audiences. Shoppers see a
//! currency-prefixed price, administrators a suffixed one, and products
//! with no remaining stock are labelled `SOLD OUT`.

use rusty_money::{Formatter, Params, Position};

use crate::cart::Cart;
use crate::pricing::Amount;
use crate::products::Product;

/// Which audience a price label is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Currency-prefixed shopper display, e.g. `₩1,000`.
    Shopper,
    /// Suffixed admin display, e.g. `1,000원`.
    Admin,
}

/// Render `price` in the given display mode.
#[must_use]
pub fn price_string(price: Amount, mode: DisplayMode) -> String {
    match mode {
        DisplayMode::Shopper => price.to_string(),
        DisplayMode::Admin => Formatter::money(
            &price,
            Params {
                symbol: Some("원"),
                positions: &[Position::Sign, Position::Amount, Position::Symbol],
                ..Params::default()
            },
        ),
    }
}

/// Label for a product's price, or `SOLD OUT` when no stock remains for
/// `product` given what `cart` already holds.
#[must_use]
pub fn price_label(product: &Product, cart: &Cart, mode: DisplayMode) -> String {
    if cart.remaining_stock(product) <= 0 {
        return "SOLD OUT".to_string();
    }
    price_string(product.price, mode)
}
