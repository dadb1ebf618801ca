//! Pricing
//!
//! Cart-level totals. Line discounts are folded first, with the bulk
//! flag computed once for the whole cart, then the active coupon is
//! applied to the running total.

use decimal_percentage::Percentage;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{
    Money, MoneyError,
    iso::{Currency, KRW},
};
use thiserror::Error;

use crate::cart::Cart;
use crate::coupons::{Coupon, CouponBenefit};
use crate::discounts::{self, DiscountError};

/// Monetary amount in the storefront's single currency.
pub type Amount = Money<'static, Currency>;

/// Total Calculation Errors
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Total arithmetic overflowed or produced an unrepresentable
    /// value.
    #[error("total arithmetic overflowed")]
    Arithmetic,
    /// Wrapped line discount error.
    #[error(transparent)]
    Discount(#[from] DiscountError),
    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Cart totals before and after discounts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals {
    /// Sum of every line's undiscounted subtotal.
    pub total_before_discount: Amount,
    /// Payable total after line discounts and the active coupon.
    pub total_after_discount: Amount,
}

impl CartTotals {
    /// The absolute amount saved against the undiscounted total.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction fails.
    pub fn savings(&self) -> Result<Amount, MoneyError> {
        self.total_before_discount.sub(self.total_after_discount)
    }

    /// The fraction saved against the undiscounted total, or zero for
    /// an empty cart.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the savings cannot be computed.
    pub fn savings_percent(&self) -> Result<Percentage, MoneyError> {
        let before_minor = self.total_before_discount.to_minor_units();
        if before_minor == 0 {
            return Ok(Percentage::from(0.0));
        }

        let savings_dec =
            Decimal::from_i64(self.savings()?.to_minor_units()).unwrap_or(Decimal::ZERO);
        let before_dec = Decimal::from_i64(before_minor).unwrap_or(Decimal::ONE);

        Ok(Percentage::from(savings_dec / before_dec))
    }
}

/// Compute the cart's totals, applying `coupon` after every line
/// discount.
///
/// An empty cart yields zero totals; an amount coupon can then still be
/// applied but is floored at zero.
///
/// # Errors
///
/// Returns a [`PricingError`] if any line total or the coupon fold
/// overflows.
pub fn cart_totals(cart: &Cart, coupon: Option<&Coupon>) -> Result<CartTotals, PricingError> {
    let bulk_unlocked = cart.bulk_discount_unlocked();

    let mut before: i64 = 0;
    let mut after: i64 = 0;
    for line in cart.iter() {
        let original = discounts::undiscounted_line_minor(line)?;
        before = before.checked_add(original).ok_or(PricingError::Arithmetic)?;

        let discounted = discounts::discounted_line_total(line, bulk_unlocked)?;
        after = after
            .checked_add(discounted.to_minor_units())
            .ok_or(PricingError::Arithmetic)?;
    }

    if let Some(coupon) = coupon {
        after = apply_coupon_to_minor(after, coupon)?;
    }

    Ok(CartTotals {
        total_before_discount: Money::from_minor(before, KRW),
        total_after_discount: Money::from_minor(after, KRW),
    })
}

/// Fold a coupon into a payable total expressed in minor units.
fn apply_coupon_to_minor(total_minor: i64, coupon: &Coupon) -> Result<i64, PricingError> {
    match coupon.benefit {
        CouponBenefit::AmountOff(amount) => {
            Ok(0.max(total_minor.saturating_sub(amount.to_minor_units())))
        }
        CouponBenefit::PercentOff(percent) => {
            let total_dec = Decimal::from_i64(total_minor).ok_or(PricingError::Arithmetic)?;
            let kept = Decimal::ONE - percent * Decimal::ONE;
            kept.checked_mul(total_dec)
                .map(|total| {
                    total.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                })
                .and_then(|total| total.to_i64())
                .ok_or(PricingError::Arithmetic)
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::cart::CartLine;
    use crate::products::{DiscountTier, Product, ProductId};

    use super::*;

    fn product(id: &str, price: i64, tiers: &[(u32, f64)]) -> Product {
        Product {
            id: ProductId::from(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Money::from_minor(price, KRW),
            stock: 999,
            discounts: tiers
                .iter()
                .map(|(quantity, rate)| DiscountTier::new(*quantity, Percentage::from(*rate)))
                .collect(),
        }
    }

    fn cart(lines: &[(&Product, u32)]) -> Cart {
        let lines: Vec<CartLine> = lines
            .iter()
            .map(|(product, quantity)| CartLine {
                product: (*product).clone(),
                quantity: *quantity,
            })
            .collect();
        Cart::with_lines(lines)
    }

    fn amount_coupon(minor: i64) -> Coupon {
        Coupon {
            name: "Amount off".to_string(),
            code: "AMOUNT01".to_string(),
            benefit: CouponBenefit::AmountOff(Money::from_minor(minor, KRW)),
        }
    }

    fn percent_coupon(rate: f64) -> Coupon {
        Coupon {
            name: "Percent off".to_string(),
            code: "PERCENT1".to_string(),
            benefit: CouponBenefit::PercentOff(Percentage::from(rate)),
        }
    }

    #[test]
    fn empty_cart_totals_are_zero() -> TestResult {
        let totals = cart_totals(&Cart::new(), None)?;

        assert_eq!(totals.total_before_discount, Money::from_minor(0, KRW));
        assert_eq!(totals.total_after_discount, Money::from_minor(0, KRW));
        assert_eq!(totals.savings(), Ok(Money::from_minor(0, KRW)));
        assert_eq!(totals.savings_percent(), Ok(Percentage::from(0.0)));
        Ok(())
    }

    #[test]
    fn totals_sum_discounted_lines() -> TestResult {
        let mouse = product("p-mouse", 1_000, &[(10, 0.1)]);
        let keyboard = product("p-keyboard", 2_000, &[]);
        let cart = cart(&[(&mouse, 10), (&keyboard, 1)]);

        let totals = cart_totals(&cart, None)?;

        // Mouse: 10,000 at 15% off (tier plus bulk bonus) = 8,500.
        // Keyboard: 2,000 at the 5% bulk bonus = 1,900.
        assert_eq!(totals.total_before_discount, Money::from_minor(12_000, KRW));
        assert_eq!(totals.total_after_discount, Money::from_minor(10_400, KRW));
        Ok(())
    }

    #[test]
    fn amount_coupons_subtract_and_floor_at_zero() -> TestResult {
        let mouse = product("p-mouse", 1_000, &[]);
        let cart = cart(&[(&mouse, 3)]);

        let modest = cart_totals(&cart, Some(&amount_coupon(1_000)))?;
        let oversized = cart_totals(&cart, Some(&amount_coupon(50_000)))?;

        assert_eq!(modest.total_after_discount, Money::from_minor(2_000, KRW));
        assert_eq!(oversized.total_after_discount, Money::from_minor(0, KRW));
        Ok(())
    }

    #[test]
    fn percent_coupons_scale_and_round_half_up() -> TestResult {
        let widget = product("p-widget", 1_999, &[]);
        let cart = cart(&[(&widget, 5)]);

        let totals = cart_totals(&cart, Some(&percent_coupon(0.1)))?;

        // 9,995 at 10% off is 8,995.5, which rounds up to 8,996.
        assert_eq!(totals.total_after_discount, Money::from_minor(8_996, KRW));
        Ok(())
    }

    #[test]
    fn coupons_apply_after_line_discounts() -> TestResult {
        let mouse = product("p-mouse", 1_000, &[(10, 0.1)]);
        let cart = cart(&[(&mouse, 10)]);

        let totals = cart_totals(&cart, Some(&amount_coupon(500)))?;

        // 10,000 at 15% off is 8,500, then 500 off.
        assert_eq!(totals.total_after_discount, Money::from_minor(8_000, KRW));
        Ok(())
    }

    #[test]
    fn savings_compare_the_two_totals() -> TestResult {
        let mouse = product("p-mouse", 1_000, &[(10, 0.1)]);
        let cart = cart(&[(&mouse, 10)]);

        let totals = cart_totals(&cart, None)?;

        assert_eq!(totals.savings(), Ok(Money::from_minor(1_500, KRW)));
        assert_eq!(totals.savings_percent(), Ok(Percentage::from(0.15)));
        Ok(())
    }

    #[test]
    fn coupons_on_an_empty_cart_keep_the_total_at_zero() -> TestResult {
        let with_amount = cart_totals(&Cart::new(), Some(&amount_coupon(5_000)))?;
        let with_percent = cart_totals(&Cart::new(), Some(&percent_coupon(0.1)))?;

        assert_eq!(with_amount.total_after_discount, Money::from_minor(0, KRW));
        assert_eq!(with_percent.total_after_discount, Money::from_minor(0, KRW));
        Ok(())
    }
}
