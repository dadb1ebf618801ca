//! Validation
//!
//! Pure predicates and sanitizers for raw catalog and coupon input.
//! Nothing here rejects on its own: predicates report whether a value is
//! acceptable, sanitizers return cleaned text, and callers decide what
//! to do with an invalid field.

/// Upper bound for product stock counts.
pub const MAX_STOCK: i64 = 9_999;

/// Upper bound for amount-off coupon values, in minor units.
pub const MAX_DISCOUNT_AMOUNT: i64 = 100_000;

/// Whether `minor` is an acceptable unit price. Prices must be strictly
/// positive.
#[must_use]
pub fn is_valid_price(minor: i64) -> bool {
    minor > 0
}

/// Whether `stock` is an acceptable stock count. Stock may be zero but
/// never negative.
#[must_use]
pub fn is_valid_stock(stock: i64) -> bool {
    stock >= 0
}

/// Whether `stock` lies within `0..=max`.
#[must_use]
pub fn is_valid_stock_range(stock: i64, max: i64) -> bool {
    (0..=max).contains(&stock)
}

/// Whether `code` is a well-formed coupon code: 4 to 12 characters,
/// uppercase ASCII letters and digits only.
#[must_use]
pub fn is_valid_coupon_code(code: &str) -> bool {
    (4..=12).contains(&code.len())
        && code
            .chars()
            .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit())
}

/// Whether `points` is an acceptable percentage discount, in whole
/// percentage points from 0 to 100.
#[must_use]
pub fn is_valid_discount_rate(points: i64) -> bool {
    (0..=100).contains(&points)
}

/// Whether `minor` is an acceptable amount discount, from zero up to
/// `max` minor units.
#[must_use]
pub fn is_valid_discount_amount(minor: i64, max: i64) -> bool {
    (0..=max).contains(&minor)
}

/// Strip every character that is not an ASCII digit.
#[must_use]
pub fn extract_numbers(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

/// Whether `text` is empty or consists solely of ASCII digits.
#[must_use]
pub fn is_numeric_string(text: &str) -> bool {
    text.chars().all(|ch| ch.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_must_be_positive() {
        assert!(is_valid_price(1));
        assert!(is_valid_price(100_000));
        assert!(!is_valid_price(0));
        assert!(!is_valid_price(-500));
    }

    #[test]
    fn stock_may_be_zero_but_not_negative() {
        assert!(is_valid_stock(0));
        assert!(is_valid_stock(9_999));
        assert!(!is_valid_stock(-1));
    }

    #[test]
    fn stock_range_is_inclusive_on_both_ends() {
        assert!(is_valid_stock_range(0, MAX_STOCK));
        assert!(is_valid_stock_range(MAX_STOCK, MAX_STOCK));
        assert!(!is_valid_stock_range(MAX_STOCK + 1, MAX_STOCK));
        assert!(!is_valid_stock_range(-1, MAX_STOCK));
    }

    #[test]
    fn coupon_codes_are_uppercase_alphanumeric() {
        assert!(is_valid_coupon_code("SAVE10"));
        assert!(is_valid_coupon_code("A1B2"));
        assert!(is_valid_coupon_code("ABCDEFGH1234"));
        assert!(!is_valid_coupon_code("ABC"));
        assert!(!is_valid_coupon_code("ABCDEFGHIJKLM"));
        assert!(!is_valid_coupon_code("save10"));
        assert!(!is_valid_coupon_code("SAVE 10"));
        assert!(!is_valid_coupon_code("SAVE-10"));
    }

    #[test]
    fn discount_rate_is_whole_percentage_points() {
        assert!(is_valid_discount_rate(0));
        assert!(is_valid_discount_rate(100));
        assert!(!is_valid_discount_rate(101));
        assert!(!is_valid_discount_rate(-1));
    }

    #[test]
    fn discount_amount_is_bounded() {
        assert!(is_valid_discount_amount(0, MAX_DISCOUNT_AMOUNT));
        assert!(is_valid_discount_amount(MAX_DISCOUNT_AMOUNT, MAX_DISCOUNT_AMOUNT));
        assert!(!is_valid_discount_amount(MAX_DISCOUNT_AMOUNT + 1, MAX_DISCOUNT_AMOUNT));
        assert!(!is_valid_discount_amount(-1, MAX_DISCOUNT_AMOUNT));
    }

    #[test]
    fn extract_numbers_keeps_digits_only() {
        assert_eq!(extract_numbers("1,000"), "1000");
        assert_eq!(extract_numbers("abc123def456"), "123456");
        assert_eq!(extract_numbers("no digits"), "");
        assert_eq!(extract_numbers(""), "");
    }

    #[test]
    fn numeric_string_accepts_empty_and_digits() {
        assert!(is_numeric_string(""));
        assert!(is_numeric_string("0042"));
        assert!(!is_numeric_string("1.5"));
        assert!(!is_numeric_string("12a"));
    }
}
