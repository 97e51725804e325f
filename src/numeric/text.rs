// ============================================================================
// Positional Text
// Formatting and parsing rationals in bases 2..=36
// ============================================================================

use super::errors::{NumericError, NumericResult};
use super::rounding::round;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// `base^digits` as an integer.
#[inline]
pub(crate) fn radix_power(base: u32, digits: u32) -> BigInt {
    BigInt::from(base).pow(digits)
}

/// Writes `value` with exactly `digits` fractional digits in `base`, rounding
/// half away from zero when `value` needs more.
pub fn format_fixed(value: &BigRational, base: u32, digits: u32) -> String {
    let k = radix_power(base, digits);
    let scaled = round(&(value * BigRational::from_integer(k.clone())));
    render(&scaled, &k, base, digits, false)
}

/// Writes `value` in `base` with the shortest fractional part that stays
/// exact, scanning at most `max_digits` fractional digits.
///
/// Values that need more digits are rounded at `max_digits`.
pub fn format_trimmed(value: &BigRational, base: u32, max_digits: u32) -> String {
    let k = radix_power(base, max_digits);
    let scaled = round(&(value * BigRational::from_integer(k.clone())));
    render(&scaled, &k, base, max_digits, true)
}

fn render(scaled: &BigInt, k: &BigInt, base: u32, digits: u32, trim: bool) -> String {
    let magnitude = scaled.abs();
    let int_part = &magnitude / k;
    let frac_part = &magnitude % k;

    let mut out = String::new();
    if scaled.is_negative() {
        out.push('-');
    }
    out.push_str(&int_part.to_str_radix(base));

    if digits > 0 {
        let raw = frac_part.to_str_radix(base);
        let mut frac = "0".repeat(digits as usize - raw.len());
        frac.push_str(&raw);
        if trim {
            let kept = frac.trim_end_matches('0').len();
            frac.truncate(kept);
        }
        if !frac.is_empty() {
            out.push('.');
            out.push_str(&frac);
        }
    }
    out
}

/// Parses `[+-]digits[.digits]` in `base` into an exact rational.
///
/// Either side of the point may be empty, but not both. Digits are
/// case-insensitive.
pub fn parse_radix(s: &str, base: u32) -> NumericResult<BigRational> {
    let s = s.trim();
    let (negative, body) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (int_str, frac_str) = match body.find('.') {
        Some(pos) => (&body[..pos], &body[pos + 1..]),
        None => (body, ""),
    };
    if int_str.is_empty() && frac_str.is_empty() {
        return Err(NumericError::InvalidInput);
    }

    let radix = BigInt::from(base);
    let mut numerator = BigInt::zero();
    for c in int_str.chars().chain(frac_str.chars()) {
        let digit = c.to_digit(base).ok_or(NumericError::InvalidInput)?;
        numerator = numerator * &radix + BigInt::from(digit);
    }

    let denominator = if frac_str.is_empty() {
        BigInt::one()
    } else {
        let len = u32::try_from(frac_str.len()).map_err(|_| NumericError::InvalidInput)?;
        radix_power(base, len)
    };

    let value = BigRational::new(numerator, denominator);
    Ok(if negative { -value } else { value })
}
