//! Till
//!
//! Till is a cart pricing and inventory engine for a single-currency
//! storefront. It covers catalog and coupon administration, stock-gated
//! cart mutations, quantity-tiered and bulk discounts, coupon
//! application, JSON snapshot persistence, and table-rendered receipts.

pub mod cart;
pub mod coupons;
pub mod discounts;
pub mod fixtures;
pub mod format;
pub mod notices;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod snapshot;
pub mod store;
pub mod storefront;
pub mod validation;
