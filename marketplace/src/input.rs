//! Lenient parsing of free-form numeric form input.
//!
//! Quantity and price fields accept whatever the user typed. Only the leading
//! numeric prefix counts (`"12abc"` is 12), surrounding whitespace is
//! ignored, and input without any digits parses as nothing.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses a ticket quantity
///
/// Non-numeric or empty input and negative numbers give 0. Values beyond
/// `u32::MAX` saturate.
#[must_use]
pub fn parse_quantity(input: &str) -> u32 {
    let trimmed = input.trim_start();
    let (negative, rest) = split_sign(trimmed);

    let digits: &str = leading(rest, |c| c.is_ascii_digit());
    if digits.is_empty() || negative {
        return 0;
    }

    digits.bytes().fold(0_u32, |acc, digit| {
        acc.saturating_mul(10).saturating_add(u32::from(digit - b'0'))
    })
}

/// Parses a decimal amount, keeping its sign
///
/// Returns `None` when the input has no leading number or the number does not
/// fit in a [`Decimal`].
#[must_use]
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let trimmed = input.trim_start();
    let (negative, rest) = split_sign(trimmed);

    let integer = leading(rest, |c| c.is_ascii_digit());
    let after_integer = &rest[integer.len()..];
    let fraction = after_integer
        .strip_prefix('.')
        .map_or("", |tail| leading(tail, |c| c.is_ascii_digit()));

    if integer.is_empty() && fraction.is_empty() {
        return None;
    }

    let literal = format!(
        "{}{}.{}",
        if negative { "-" } else { "" },
        if integer.is_empty() { "0" } else { integer },
        if fraction.is_empty() { "0" } else { fraction },
    );
    Decimal::from_str(&literal).ok()
}

fn split_sign(input: &str) -> (bool, &str) {
    if let Some(rest) = input.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = input.strip_prefix('+') {
        (false, rest)
    } else {
        (false, input)
    }
}

fn leading(input: &str, accept: impl Fn(char) -> bool) -> &str {
    let end = input
        .char_indices()
        .find(|(_, c)| !accept(*c))
        .map_or(input.len(), |(index, _)| index);
    &input[..end]
}
