//! Decimal/fixed-point conversion
//!
//! Token amounts travel on chain as integers scaled by the token's decimal
//! count. Conversion works on decimal strings so that amounts like
//! `104999.999999999999999` survive the round trip exactly; routing the same
//! literal through `f64` first loses the low digits.

use alloy_primitives::U256;

use crate::error::{Error, Result};

/// Scale a decimal string up by `decimals` digits into an on-chain integer.
///
/// Fails on empty or non-digit input, on a fraction longer than `decimals`,
/// and on overflow. Negative amounts are rejected.
pub fn to_fixed(value: &str, decimals: u8) -> Result<U256> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::numeric("empty amount"));
    }
    if value.starts_with('-') {
        return Err(Error::numeric(format!("negative amount: {value}")));
    }

    let (integer_part, fraction_part) = match value.find('.') {
        Some(pos) => (&value[..pos], &value[pos + 1..]),
        None => (value, ""),
    };
    if integer_part.is_empty() && fraction_part.is_empty() {
        return Err(Error::numeric(format!("invalid amount: {value}")));
    }
    if !is_digits(integer_part) || !is_digits(fraction_part) {
        return Err(Error::numeric(format!("invalid amount: {value}")));
    }
    if fraction_part.len() > decimals as usize {
        return Err(Error::numeric(format!(
            "{value} has more fractional digits than the token's {decimals} decimals"
        )));
    }

    // Shift left: append the fraction and pad with zeros up to `decimals`.
    let padding = decimals as usize - fraction_part.len();
    let mut digits = String::with_capacity(integer_part.len() + decimals as usize);
    digits.push_str(integer_part);
    digits.push_str(fraction_part);
    digits.extend(std::iter::repeat('0').take(padding));
    if digits.is_empty() {
        digits.push('0');
    }

    U256::from_str_radix(&digits, 10)
        .map_err(|_| Error::numeric(format!("amount out of range: {value}")))
}

/// Scale an on-chain integer down by `decimals` digits into a decimal string.
///
/// Trailing fractional zeros are trimmed; whole values come back without a
/// fractional part. Exact inverse of [`to_fixed`] for representable values.
pub fn from_fixed(value: U256, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let raw = value.to_string();
    let width = decimals as usize;
    let padded = format!("{raw:0>pad$}", pad = width + 1);
    let split = padded.len() - width;
    let integer_part = &padded[..split];
    let fraction_part = padded[split..].trim_end_matches('0');
    if fraction_part.is_empty() {
        integer_part.to_string()
    } else {
        format!("{integer_part}.{fraction_part}")
    }
}

/// Lossy `f64` convenience entry point.
///
/// Goes through the shortest decimal rendering of the float, so amounts with
/// more significant digits than `f64` carries will not survive. Prefer
/// [`to_fixed`] with a string when exactness matters.
pub fn to_fixed_f64(value: f64, decimals: u8) -> Result<U256> {
    if !value.is_finite() {
        return Err(Error::numeric(format!("non-finite amount: {value}")));
    }
    to_fixed(&format!("{value}"), decimals)
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}
