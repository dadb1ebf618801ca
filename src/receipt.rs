//! Receipt
//!
//! Table-rendered views of the catalog and the cart, written to any
//! [`io::Write`] destination. The cart view ends with a summary of the
//! totals, the active coupon and the savings.

use std::io;

use rust_decimal::Decimal;
use rusty_money::MoneyError;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::cart::Cart;
use crate::coupons::{Coupon, CouponBenefit};
use crate::discounts::{DiscountError, discount_percent_points, discounted_line_total};
use crate::format::{DisplayMode, price_label, price_string};
use crate::pricing::{PricingError, cart_totals};
use crate::products::{Catalog, Product};

/// Receipt Rendering Errors
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapped totals calculation error
    #[error(transparent)]
    Pricing(#[from] PricingError),
    /// Wrapped line discount error
    #[error(transparent)]
    Discount(#[from] DiscountError),
    /// Wrapped money arithmetic error
    #[error(transparent)]
    Money(#[from] MoneyError),
    /// IO error
    #[error("IO error")]
    Io,
}

/// Write the product listing with stock-aware price labels.
///
/// # Errors
///
/// Returns [`ReceiptError::Io`] if the table cannot be written.
pub fn write_catalog(
    mut out: impl io::Write,
    catalog: &Catalog,
    cart: &Cart,
    mode: DisplayMode,
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();
    builder.push_record(["Product", "Price", "Remaining", "Discounts"]);

    for product in catalog.iter() {
        builder.push_record([
            product.name.clone(),
            price_label(product, cart, mode),
            cart.remaining_stock(product).to_string(),
            tier_summary(product),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(1..), Alignment::right());

    writeln!(out, "{table}").map_err(|_err| ReceiptError::Io)
}

/// Write the cart lines followed by the totals summary.
///
/// # Errors
///
/// Returns a [`ReceiptError`] if a line total cannot be computed or the
/// output cannot be written.
pub fn write_cart(
    mut out: impl io::Write,
    cart: &Cart,
    coupon: Option<&Coupon>,
) -> Result<(), ReceiptError> {
    let bulk_unlocked = cart.bulk_discount_unlocked();

    let mut builder = Builder::default();
    builder.push_record(["Item", "Qty", "Unit Price", "Line Total", "Discount"]);

    for line in cart.iter() {
        let line_total = discounted_line_total(line, bulk_unlocked)?;
        let points = discount_percent_points(line, bulk_unlocked)?;
        let discount_cell = if points == 0 {
            String::new()
        } else {
            format!("-{points}%")
        };

        builder.push_record([
            line.product.name.clone(),
            line.quantity.to_string(),
            price_string(line.product.price, DisplayMode::Shopper),
            price_string(line_total, DisplayMode::Shopper),
            discount_cell,
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(1..), Alignment::right());

    writeln!(out, "{table}").map_err(|_err| ReceiptError::Io)?;
    write_summary(&mut out, cart, coupon)
}

fn write_summary(
    out: &mut impl io::Write,
    cart: &Cart,
    coupon: Option<&Coupon>,
) -> Result<(), ReceiptError> {
    let totals = cart_totals(cart, coupon)?;

    writeln!(
        out,
        " Subtotal: {}",
        price_string(totals.total_before_discount, DisplayMode::Shopper)
    )
    .map_err(|_err| ReceiptError::Io)?;

    if let Some(coupon) = coupon {
        writeln!(out, " Coupon:   {} ({})", coupon.name, benefit_summary(coupon))
            .map_err(|_err| ReceiptError::Io)?;
    }

    let savings = totals.savings()?;
    if savings.to_minor_units() > 0 {
        writeln!(
            out,
            " Savings:  -{}",
            price_string(savings, DisplayMode::Shopper)
        )
        .map_err(|_err| ReceiptError::Io)?;
    }

    writeln!(
        out,
        " Total:    {}",
        price_string(totals.total_after_discount, DisplayMode::Shopper)
    )
    .map_err(|_err| ReceiptError::Io)
}

/// One line per discount tier, e.g. `10+ units: 10%`.
fn tier_summary(product: &Product) -> String {
    let parts: Vec<String> = product
        .discounts
        .iter()
        .map(|tier| {
            let points = (tier.rate() * Decimal::ONE_HUNDRED).normalize();
            format!("{}+ units: {points}%", tier.quantity())
        })
        .collect();
    parts.join("\n")
}

fn benefit_summary(coupon: &Coupon) -> String {
    match coupon.benefit {
        CouponBenefit::AmountOff(amount) => {
            format!("{} off", price_string(amount, DisplayMode::Shopper))
        }
        CouponBenefit::PercentOff(percent) => {
            let points = (percent * Decimal::ONE_HUNDRED).normalize();
            format!("{points}% off")
        }
    }
}
