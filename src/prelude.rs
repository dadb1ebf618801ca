//! Till prelude.
//!
//! Convenience re-exports for the common surface of the crate.

pub use crate::{
    cart::{Cart, CartDenial, CartLine},
    coupons::{Coupon, CouponBenefit, CouponBook, CouponDenial, PERCENT_COUPON_MIN_TOTAL},
    discounts::{BULK_TRIGGER_QUANTITY, DiscountError},
    fixtures::{FixtureError, load_seed, seed_from_str},
    format::DisplayMode,
    notices::{Notice, NoticeHub, NoticeId, Severity},
    pricing::{Amount, CartTotals, PricingError, cart_totals},
    products::{Catalog, DiscountTier, NewProduct, Product, ProductId, ProductPatch},
    receipt::ReceiptError,
    snapshot::{CART_KEY, COUPONS_KEY, PRODUCTS_KEY, SnapshotError},
    store::{JsonFileStore, KvStore, MemoryStore, StoreError},
    storefront::{Seed, Storefront, StorefrontError},
};
