// ============================================================================
// Exact Rounding
// Floor, ceiling, rounding and truncation over arbitrary-precision rationals
// ============================================================================
//
// Every function here is exact: results are computed on BigInt/BigRational
// without any floating-point intermediate. Doubles are lifted losslessly
// through `float::rational_from_f64` first.

use super::exactness::Exactness;
use super::float::rational_from_f64;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

// ============================================================================
// Truncation
// ============================================================================

/// Divides `numerator` by `denominator`, truncating toward zero.
///
/// Returns `(quotient, remainder, exactness)` where the remainder carries the
/// sign of the numerator and the tag tells whether the quotient equals,
/// exceeds or falls short of the true ratio.
///
/// # Panics
/// Panics if `denominator` is zero, like integer division does.
pub fn trunc_div(numerator: &BigInt, denominator: &BigInt) -> (BigInt, BigInt, Exactness) {
    let (quotient, remainder) = numerator.div_rem(denominator);
    let exactness = if remainder.is_zero() {
        Exactness::Exact
    } else if remainder.is_negative() == denominator.is_negative() {
        // remainder / denominator > 0: the true ratio lies above the quotient
        Exactness::RoundedDown
    } else {
        Exactness::RoundedUp
    };
    (quotient, remainder, exactness)
}

/// Truncates `x` toward zero.
#[inline]
pub fn trunc(x: &BigRational) -> (BigInt, Exactness) {
    let (quotient, _, exactness) = trunc_div(x.numer(), x.denom());
    (quotient, exactness)
}

// ============================================================================
// Floor / Ceil / Round
// ============================================================================

/// Greatest integer less than or equal to `x`.
pub fn floor(x: &BigRational) -> BigInt {
    let (quotient, exactness) = trunc(x);
    match exactness {
        Exactness::RoundedUp => quotient - BigInt::one(),
        _ => quotient,
    }
}

/// Least integer greater than or equal to `x`.
pub fn ceil(x: &BigRational) -> BigInt {
    let (quotient, exactness) = trunc(x);
    match exactness {
        Exactness::RoundedDown => quotient + BigInt::one(),
        _ => quotient,
    }
}

/// Nearest integer to `x`, ties rounded away from zero.
///
/// Computed as `sign(x) * floor(|x| + 1/2)` with an exact one-half.
pub fn round(x: &BigRational) -> BigInt {
    let half = BigRational::new(BigInt::one(), BigInt::from(2));
    let magnitude = floor(&(x.abs() + half));
    if x.is_negative() {
        -magnitude
    } else {
        magnitude
    }
}

/// `floor` for doubles; `None` for infinities and NaN.
#[inline]
pub fn floor_f64(x: f64) -> Option<BigInt> {
    rational_from_f64(x).map(|r| floor(&r))
}

/// `ceil` for doubles; `None` for infinities and NaN.
#[inline]
pub fn ceil_f64(x: f64) -> Option<BigInt> {
    rational_from_f64(x).map(|r| ceil(&r))
}

/// `round` for doubles; `None` for infinities and NaN.
#[inline]
pub fn round_f64(x: f64) -> Option<BigInt> {
    rational_from_f64(x).map(|r| round(&r))
}

// ============================================================================
// Clamped Integer Conversion
// ============================================================================

/// Truncates `x` toward zero into an `i64`.
///
/// Out-of-range values clamp to `(i64::MIN, RoundedUp)` or
/// `(i64::MAX, RoundedDown)`.
pub fn to_i64(x: &BigRational) -> (i64, Exactness) {
    let (n, exactness) = trunc(x);
    clamp_integer(n, exactness, i64::MIN, i64::MAX)
}

/// Truncates `x` toward zero into a `u64`.
///
/// Out-of-range values clamp to `(0, RoundedUp)` or `(u64::MAX, RoundedDown)`.
pub fn to_u64(x: &BigRational) -> (u64, Exactness) {
    let (n, exactness) = trunc(x);
    clamp_integer(n, exactness, u64::MIN, u64::MAX)
}

pub(crate) fn clamp_integer<T>(n: BigInt, exactness: Exactness, min: T, max: T) -> (T, Exactness)
where
    T: TryFrom<BigInt>,
{
    let negative = n.is_negative();
    match T::try_from(n) {
        Ok(value) => (value, exactness),
        Err(_) if negative => (min, Exactness::RoundedUp),
        Err(_) => (max, Exactness::RoundedDown),
    }
}

// ============================================================================
// Tests
// ============================================================================
