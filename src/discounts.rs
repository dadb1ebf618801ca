//! Discounts
//!
//! Line-level discount arithmetic. A cart line earns the highest
//! quantity tier its quantity has reached, plus a cart-wide bulk bonus
//! once any line reaches the trigger quantity. The combined rate never
//! exceeds the ceiling, whatever the tiers say.
//!
//! All money math happens in minor units through [`Decimal`], with
//! half-up rounding away from zero.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso::KRW};
use thiserror::Error;

use crate::cart::{Cart, CartLine};
use crate::pricing::Amount;

/// Line quantity at which the cart-wide bulk bonus unlocks.
pub const BULK_TRIGGER_QUANTITY: u32 = 10;

/// Flat rate added to every line once the bulk bonus is unlocked.
fn bulk_bonus() -> Decimal {
    Decimal::new(5, 2)
}

/// Hard ceiling on the combined discount rate.
fn rate_ceiling() -> Decimal {
    Decimal::new(5, 1)
}

/// Discount Calculation Errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Discount arithmetic overflowed or produced an unrepresentable
    /// value.
    #[error("discount arithmetic overflowed")]
    Arithmetic,
}

/// The fractional discount rate earned by `line` within `cart`.
#[must_use]
pub fn max_applicable_rate(line: &CartLine, cart: &Cart) -> Decimal {
    applicable_rate(line, cart.bulk_discount_unlocked())
}

/// The fractional discount rate earned by `line`, with the cart-wide
/// bulk flag supplied by the caller.
///
/// The base rate is the highest tier whose threshold the line quantity
/// has reached, or zero when no tier applies. The bulk bonus is added
/// on top when unlocked, and the combined rate is clamped to the
/// ceiling.
#[must_use]
pub fn applicable_rate(line: &CartLine, bulk_unlocked: bool) -> Decimal {
    let base = line
        .product
        .discounts
        .iter()
        .filter(|tier| line.quantity >= tier.quantity())
        .map(|tier| tier.rate() * Decimal::ONE)
        .max()
        .unwrap_or(Decimal::ZERO);

    let rate = if bulk_unlocked {
        base + bulk_bonus()
    } else {
        base
    };

    rate.min(rate_ceiling())
}

/// The line subtotal before any discount, in minor units.
///
/// # Errors
///
/// Returns [`DiscountError::Arithmetic`] if the multiplication
/// overflows.
pub fn undiscounted_line_minor(line: &CartLine) -> Result<i64, DiscountError> {
    line.product
        .price
        .to_minor_units()
        .checked_mul(i64::from(line.quantity))
        .ok_or(DiscountError::Arithmetic)
}

/// The discounted line total for `line` within `cart`.
///
/// # Errors
///
/// Returns [`DiscountError::Arithmetic`] if the arithmetic overflows or
/// the rounded total cannot be represented in minor units.
pub fn line_total(line: &CartLine, cart: &Cart) -> Result<Amount, DiscountError> {
    discounted_line_total(line, cart.bulk_discount_unlocked())
}

/// The discounted line total, with the cart-wide bulk flag supplied by
/// the caller.
///
/// The undiscounted subtotal is scaled by one minus the applicable rate
/// and rounded half-up to whole minor units.
///
/// # Errors
///
/// Returns [`DiscountError::Arithmetic`] if the arithmetic overflows or
/// the rounded total cannot be represented in minor units.
pub fn discounted_line_total(
    line: &CartLine,
    bulk_unlocked: bool,
) -> Result<Amount, DiscountError> {
    let rate = applicable_rate(line, bulk_unlocked);
    let original = undiscounted_line_minor(line)?;
    let original_dec = Decimal::from_i64(original).ok_or(DiscountError::Arithmetic)?;

    let minor = (Decimal::ONE - rate)
        .checked_mul(original_dec)
        .and_then(round_to_minor)
        .ok_or(DiscountError::Arithmetic)?;

    Ok(Money::from_minor(minor, KRW))
}

/// The whole-number percentage shown against a line, derived from the
/// ratio of its discounted total to its undiscounted subtotal.
///
/// Returns zero whenever the discounted total is at least the
/// undiscounted subtotal.
///
/// # Errors
///
/// Returns [`DiscountError::Arithmetic`] if the underlying totals
/// cannot be computed.
pub fn discount_percent_points(line: &CartLine, bulk_unlocked: bool) -> Result<u32, DiscountError> {
    let original = undiscounted_line_minor(line)?;
    let total = discounted_line_total(line, bulk_unlocked)?.to_minor_units();
    if total >= original {
        return Ok(0);
    }

    let original_dec = Decimal::from_i64(original).ok_or(DiscountError::Arithmetic)?;
    let total_dec = Decimal::from_i64(total).ok_or(DiscountError::Arithmetic)?;
    let ratio = total_dec
        .checked_div(original_dec)
        .ok_or(DiscountError::Arithmetic)?;

    (Decimal::ONE - ratio)
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|points| points.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|points| points.to_u32())
        .ok_or(DiscountError::Arithmetic)
}

fn round_to_minor(value: Decimal) -> Option<i64> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use smallvec::smallvec;

    use crate::products::{DiscountTier, Product, ProductId};

    use super::*;

    fn tiered_product(price: i64, tiers: &[(u32, f64)]) -> Product {
        Product {
            id: ProductId::from("p-test"),
            name: "Test product".to_string(),
            description: String::new(),
            price: Money::from_minor(price, KRW),
            stock: 999,
            discounts: tiers
                .iter()
                .map(|(quantity, rate)| DiscountTier::new(*quantity, Percentage::from(*rate)))
                .collect(),
        }
    }

    fn line(price: i64, quantity: u32, tiers: &[(u32, f64)]) -> CartLine {
        CartLine {
            product: tiered_product(price, tiers),
            quantity,
        }
    }

    #[test]
    fn no_tier_reached_means_no_discount() {
        let line = line(1_000, 9, &[(10, 0.1)]);

        assert_eq!(applicable_rate(&line, false), Decimal::ZERO);
        assert_eq!(
            discounted_line_total(&line, false),
            Ok(Money::from_minor(9_000, KRW))
        );
    }

    #[test]
    fn reaching_a_tier_applies_its_rate() {
        let line = line(1_000, 10, &[(10, 0.1)]);

        assert_eq!(applicable_rate(&line, false), Decimal::new(1, 1));
    }

    #[test]
    fn the_highest_reached_tier_wins() {
        let tiers = [(5, 0.05), (10, 0.1), (20, 0.2)];

        assert_eq!(applicable_rate(&line(1_000, 4, &tiers), false), Decimal::ZERO);
        assert_eq!(
            applicable_rate(&line(1_000, 12, &tiers), false),
            Decimal::new(1, 1)
        );
        assert_eq!(
            applicable_rate(&line(1_000, 20, &tiers), false),
            Decimal::new(2, 1)
        );
    }

    #[test]
    fn tier_order_does_not_matter() {
        let shuffled = [(20, 0.2), (5, 0.05), (10, 0.1)];

        assert_eq!(
            applicable_rate(&line(1_000, 20, &shuffled), false),
            Decimal::new(2, 1)
        );
    }

    #[test]
    fn bulk_bonus_applies_to_every_line_even_without_tiers() {
        let line = line(1_000, 2, &[]);

        assert_eq!(applicable_rate(&line, true), Decimal::new(5, 2));
        assert_eq!(
            discounted_line_total(&line, true),
            Ok(Money::from_minor(1_900, KRW))
        );
    }

    #[test]
    fn bulk_bonus_stacks_on_top_of_the_tier_rate() {
        let line = line(1_000, 10, &[(10, 0.1)]);

        assert_eq!(applicable_rate(&line, true), Decimal::new(15, 2));
        assert_eq!(
            discounted_line_total(&line, true),
            Ok(Money::from_minor(8_500, KRW))
        );
    }

    #[test]
    fn the_combined_rate_never_exceeds_the_ceiling() {
        let over_tier = line(1_000, 10, &[(10, 0.6)]);
        let stacked = line(1_000, 10, &[(10, 0.48)]);

        assert_eq!(applicable_rate(&over_tier, false), Decimal::new(5, 1));
        assert_eq!(applicable_rate(&over_tier, true), Decimal::new(5, 1));
        assert_eq!(applicable_rate(&stacked, true), Decimal::new(5, 1));
    }

    #[test]
    fn line_totals_round_half_up() {
        // 255 * 3 * 0.9 = 688.5, which rounds up to 689.
        let line = line(255, 3, &[(3, 0.1)]);

        assert_eq!(
            discounted_line_total(&line, false),
            Ok(Money::from_minor(689, KRW))
        );
    }

    #[test]
    fn percent_points_reflect_the_rounded_total() {
        let discounted = line(1_000, 10, &[(10, 0.1)]);
        let plain = line(1_000, 2, &[]);

        assert_eq!(discount_percent_points(&discounted, false), Ok(10));
        assert_eq!(discount_percent_points(&discounted, true), Ok(15));
        assert_eq!(discount_percent_points(&plain, false), Ok(0));
    }

    #[test]
    fn rates_flow_through_the_cart_wrappers() {
        let product = tiered_product(1_000, &[(10, 0.1)]);
        let other = Product {
            id: ProductId::from("p-other"),
            name: "Other".to_string(),
            description: String::new(),
            price: Money::from_minor(500, KRW),
            stock: 999,
            discounts: smallvec![],
        };
        let cart = Cart::with_lines(vec![
            CartLine {
                product: product.clone(),
                quantity: 10,
            },
            CartLine {
                product: other,
                quantity: 1,
            },
        ]);

        let Some(tiered) = cart.line_for(&product.id) else {
            panic!("line should exist");
        };

        // One line at the trigger quantity unlocks the bonus cart-wide.
        assert_eq!(max_applicable_rate(tiered, &cart), Decimal::new(15, 2));
        assert_eq!(
            line_total(tiered, &cart),
            Ok(Money::from_minor(8_500, KRW))
        );
    }
}
