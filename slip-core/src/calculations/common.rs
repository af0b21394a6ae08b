//! Common numeric helpers for derived-field computation.
//!
//! Charge inputs arrive as the literal text of an input box. These helpers
//! turn that text into [`Decimal`] values without ever failing: anything
//! that is not a non-negative number contributes zero.
//!
//! Amounts are capped at [`MAX_AMOUNT`]: larger input fails validation and
//! is coerced to zero.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to the nearest whole number, halves away from zero.
///
/// For the non-negative totals produced here this is the same as rounding
/// halves up.
///
/// ```
/// use rust_decimal_macros::dec;
/// use slip_core::calculations::common::round_to_whole;
///
/// assert_eq!(round_to_whole(dec!(590.5)), dec!(591));
/// assert_eq!(round_to_whole(dec!(590.49)), dec!(590));
/// ```
pub fn round_to_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Largest amount accepted from user input: 10^15.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// True if `value` lies within `±MAX_AMOUNT`.
pub fn within_limit(value: Decimal) -> bool {
    value.abs() <= MAX_AMOUNT
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses user text as a number.
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`). Returns `None`
/// for blank or unparseable input.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return None;
    }
    normalized.parse().ok()
}

/// Parses user text as a non-negative number no larger than [`MAX_AMOUNT`],
/// `None` if it is not one.
pub fn parse_non_negative(s: &str) -> Option<Decimal> {
    parse_amount(s).filter(|value| {
        (!value.is_sign_negative() || value.is_zero()) && within_limit(*value)
    })
}

/// Coerces user text to a charge amount: blank, invalid, negative or
/// oversized input is 0.
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use slip_core::calculations::common::parse_number_or_zero;
///
/// assert_eq!(parse_number_or_zero("1,500"), dec!(1500));
/// assert_eq!(parse_number_or_zero(""), Decimal::ZERO);
/// assert_eq!(parse_number_or_zero("abc"), Decimal::ZERO);
/// ```
pub fn parse_number_or_zero(s: &str) -> Decimal {
    parse_non_negative(s).unwrap_or(Decimal::ZERO)
}

/// Formats `value` with exactly `places` decimals, rounding halves away from zero.
///
/// Returns `None` when `value` has too many integer digits to carry
/// `places` decimals.
pub fn format_fixed(
    value: Decimal,
    places: u32,
) -> Option<String> {
    let mut rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(places);
    (rounded.scale() == places).then(|| rounded.to_string())
}
