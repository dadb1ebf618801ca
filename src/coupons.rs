//! Coupons
//!
//! The coupon registry and the policy deciding when a coupon may be
//! applied to a cart. Coupons act on the whole payable total, after
//! every line-level discount has been taken.

use decimal_percentage::Percentage;
use thiserror::Error;

use crate::pricing::Amount;

/// Minimum couponless payable total, in minor units, before a
/// percentage coupon becomes applicable.
pub const PERCENT_COUPON_MIN_TOTAL: i64 = 10_000;

/// The benefit a coupon grants when applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CouponBenefit {
    /// Subtract a fixed amount from the payable total, floored at zero.
    AmountOff(Amount),
    /// Reduce the payable total by a fractional percentage.
    PercentOff(Percentage),
}

/// A registered coupon.
#[derive(Debug, Clone, PartialEq)]
pub struct Coupon {
    /// Display name.
    pub name: String,
    /// Registry-unique code, uppercase ASCII letters and digits.
    pub code: String,
    /// Benefit granted when the coupon is applied.
    pub benefit: CouponBenefit,
}

/// Rejections raised by coupon registration and application.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponDenial {
    /// A coupon with the same code is already registered.
    #[error("A coupon with this code already exists.")]
    DuplicateCode(String),
    /// A percentage coupon was applied below the minimum purchase total.
    #[error("Percentage coupons require a purchase of ₩10,000 or more.")]
    MinimumNotMet,
}

/// The coupon registry, ordered by insertion and unique by code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CouponBook {
    coupons: Vec<Coupon>,
}

impl CouponBook {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from existing coupons. Callers are expected to
    /// supply coupons with distinct codes; snapshot loading validates
    /// records before reaching this constructor.
    #[must_use]
    pub fn with_coupons(coupons: impl Into<Vec<Coupon>>) -> Self {
        Self {
            coupons: coupons.into(),
        }
    }

    /// Register `coupon`, returning the extended registry.
    ///
    /// # Errors
    ///
    /// Returns [`CouponDenial::DuplicateCode`] if a coupon with the same
    /// code is already registered. The registry is unchanged in that
    /// case.
    pub fn add(&self, coupon: Coupon) -> Result<Self, CouponDenial> {
        if self.contains(&coupon.code) {
            return Err(CouponDenial::DuplicateCode(coupon.code));
        }
        let mut coupons = self.coupons.clone();
        coupons.push(coupon);
        Ok(Self { coupons })
    }

    /// Remove the coupon with `code`. Unknown codes are a no-op.
    #[must_use]
    pub fn remove(&self, code: &str) -> Self {
        let coupons = self
            .coupons
            .iter()
            .filter(|coupon| coupon.code != code)
            .cloned()
            .collect();
        Self { coupons }
    }

    /// Look up a coupon by code.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Coupon> {
        self.coupons.iter().find(|coupon| coupon.code == code)
    }

    /// Whether a coupon with `code` is registered.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.coupons.iter().any(|coupon| coupon.code == code)
    }

    /// Iterate over the coupons in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Coupon> {
        self.coupons.iter()
    }

    /// Number of registered coupons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Whether the registry holds no coupons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}

/// Decide whether `coupon` may be applied when the payable total
/// without any coupon is `couponless_total`.
///
/// Amount coupons are always applicable. Percentage coupons require the
/// couponless total to reach [`PERCENT_COUPON_MIN_TOTAL`].
///
/// # Errors
///
/// Returns [`CouponDenial::MinimumNotMet`] when a percentage coupon is
/// offered below the minimum purchase total.
pub fn check_applicable(coupon: &Coupon, couponless_total: Amount) -> Result<(), CouponDenial> {
    match coupon.benefit {
        CouponBenefit::PercentOff(_)
            if couponless_total.to_minor_units() < PERCENT_COUPON_MIN_TOTAL =>
        {
            Err(CouponDenial::MinimumNotMet)
        }
        CouponBenefit::PercentOff(_) | CouponBenefit::AmountOff(_) => Ok(()),
    }
}
