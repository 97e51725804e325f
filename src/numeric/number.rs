// ============================================================================
// Fixed-Precision Number
// Rational-backed value renormalized to base^-precision after every write
// ============================================================================

use super::errors::{check_base, NumericError, NumericResult};
use super::exactness::Exactness;
use super::float::{rational_from_f64, rational_to_f32, rational_to_f64};
use super::rounding::{self, round, trunc};
use super::text::{format_fixed, format_trimmed, parse_radix, radix_power};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Largest scale a `rust_decimal::Decimal` can carry.
const DECIMAL_MAX_SCALE: u32 = 28;

/// Exact number held on the grid of multiples of `base^-precision`.
///
/// Every operation that writes a `Number` computes the exact rational result
/// first and then rounds it half away from zero onto the grid, so the stored
/// value always equals `round(value * base^precision) / base^precision`.
///
/// Precision and base are fixed at construction. Negative precisions are
/// exponents too: precision `-2` in base 10 keeps multiples of 100.
///
/// Besides finite values a `Number` can hold signed infinities and NaN, which
/// follow IEEE-754 conventions through arithmetic.
///
/// # Example
/// ```
/// use stepgrid::numeric::Number;
///
/// let mut n = Number::decimal(1);
/// n.set_f64(0.66);
/// assert_eq!(n.to_string(), "0.7");
/// ```
#[derive(Clone)]
pub struct Number {
    prec: i32,
    base: u32,
    /// base^prec, exact
    scale: BigRational,
    value: Value,
}

/// `Real` is the same type under the name used for real-valued grids.
pub type Real = Number;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Value {
    Finite(BigRational),
    Infinite { negative: bool },
    NaN,
}

fn scale_factor(prec: i32, base: u32) -> BigRational {
    let power = radix_power(base, prec.unsigned_abs());
    if prec >= 0 {
        BigRational::from_integer(power)
    } else {
        BigRational::new(BigInt::one(), power)
    }
}

impl Number {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Creates a zero with the given precision and base.
    ///
    /// # Errors
    /// Returns `InvalidBase` unless `base` is in 2..=36.
    pub fn new(prec: i32, base: u32) -> NumericResult<Self> {
        check_base(base)?;
        Ok(Self::with_checked_base(prec, base))
    }

    fn with_checked_base(prec: i32, base: u32) -> Self {
        Self {
            prec,
            base,
            scale: scale_factor(prec, base),
            value: Value::Finite(BigRational::zero()),
        }
    }

    /// Zero in base 2.
    pub fn binary(prec: i32) -> Self {
        Self::with_checked_base(prec, 2)
    }

    /// Zero in base 8.
    pub fn octal(prec: i32) -> Self {
        Self::with_checked_base(prec, 8)
    }

    /// Zero in base 10.
    pub fn decimal(prec: i32) -> Self {
        Self::with_checked_base(prec, 10)
    }

    /// Zero in base 16.
    pub fn hexadecimal(prec: i32) -> Self {
        Self::with_checked_base(prec, 16)
    }

    /// Creates a number holding `x` rounded onto the grid.
    pub fn from_f64(x: f64, prec: i32, base: u32) -> NumericResult<Self> {
        let mut n = Self::new(prec, base)?;
        n.set_f64(x);
        Ok(n)
    }

    pub fn from_i64(x: i64, prec: i32, base: u32) -> NumericResult<Self> {
        let mut n = Self::new(prec, base)?;
        n.set_i64(x);
        Ok(n)
    }

    pub fn from_integer(x: &BigInt, prec: i32, base: u32) -> NumericResult<Self> {
        let mut n = Self::new(prec, base)?;
        n.set_integer(x);
        Ok(n)
    }

    pub fn from_rational(x: &BigRational, prec: i32, base: u32) -> NumericResult<Self> {
        let mut n = Self::new(prec, base)?;
        n.set_rational(x);
        Ok(n)
    }

    /// Parses text written in `base` (see [`Number::set_str`]).
    pub fn parse(s: &str, prec: i32, base: u32) -> NumericResult<Self> {
        let mut n = Self::new(prec, base)?;
        n.set_str(s)?;
        Ok(n)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn prec(&self) -> i32 {
        self.prec
    }

    #[inline]
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Grid spacing, `base^-precision`.
    pub fn unit(&self) -> BigRational {
        self.scale.recip()
    }

    /// Borrow of the exact value, `None` for infinities and NaN.
    #[inline]
    pub fn as_rational(&self) -> Option<&BigRational> {
        match &self.value {
            Value::Finite(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn to_rational(&self) -> Option<BigRational> {
        self.as_rational().cloned()
    }

    #[inline]
    pub fn is_inf(&self) -> bool {
        matches!(self.value, Value::Infinite { .. })
    }

    #[inline]
    pub fn is_nan(&self) -> bool {
        matches!(self.value, Value::NaN)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        matches!(self.value, Value::Finite(_))
    }

    #[inline]
    pub fn is_int(&self) -> bool {
        self.as_rational().is_some_and(|v| v.is_integer())
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.as_rational().is_some_and(|v| v.is_zero())
    }

    pub fn is_positive(&self) -> bool {
        match &self.value {
            Value::Finite(v) => v.is_positive(),
            Value::Infinite { negative } => !negative,
            Value::NaN => false,
        }
    }

    pub fn is_negative(&self) -> bool {
        match &self.value {
            Value::Finite(v) => v.is_negative(),
            Value::Infinite { negative } => *negative,
            Value::NaN => false,
        }
    }

    /// True for negative values and `-inf`. Zero carries no sign.
    #[inline]
    pub fn signbit(&self) -> bool {
        self.is_negative()
    }

    /// `-1`, `0` or `+1` by the sign of the value; `None` for NaN.
    pub fn sign(&self) -> Option<i32> {
        match &self.value {
            Value::NaN => None,
            _ if self.is_negative() => Some(-1),
            _ if self.is_positive() => Some(1),
            _ => Some(0),
        }
    }

    /// Compares values regardless of precision and base, with
    /// `-inf < finite < +inf`. `None` if either side is NaN.
    pub fn compare(&self, other: &Number) -> Option<Ordering> {
        match (&self.value, &other.value) {
            (Value::NaN, _) | (_, Value::NaN) => None,
            (Value::Finite(a), Value::Finite(b)) => Some(a.cmp(b)),
            (Value::Infinite { negative: a }, Value::Infinite { negative: b }) => {
                Some(b.cmp(a))
            },
            (Value::Infinite { negative }, Value::Finite(_)) => Some(if *negative {
                Ordering::Less
            } else {
                Ordering::Greater
            }),
            (Value::Finite(_), Value::Infinite { negative }) => Some(if *negative {
                Ordering::Greater
            } else {
                Ordering::Less
            }),
        }
    }

    // ========================================================================
    // Renormalization
    // ========================================================================

    /// Projects the value onto the grid. Infinities and NaN are left alone.
    fn renormalize(&mut self) {
        if let Value::Finite(v) = &mut self.value {
            let scaled = &*v * &self.scale;
            *v = BigRational::from_integer(round(&scaled)) / &self.scale;
        }
    }

    fn store(&mut self, value: Value) -> &mut Self {
        self.value = value;
        self.renormalize();
        self
    }

    /// A number of this precision and base holding `value` renormalized.
    fn sibling(&self, value: Value) -> Self {
        let mut n = Self {
            prec: self.prec,
            base: self.base,
            scale: self.scale.clone(),
            value,
        };
        n.renormalize();
        n
    }

    // ========================================================================
    // Setters
    // ========================================================================

    /// Copies the value of `x`, rounded onto this number's grid.
    ///
    /// This is the way to move a value between precisions or bases.
    pub fn set(&mut self, x: &Number) -> &mut Self {
        self.store(x.value.clone())
    }

    /// Stores `x` exactly, then renormalizes. NaN and infinities are kept.
    pub fn set_f64(&mut self, x: f64) -> &mut Self {
        let value = if x.is_nan() {
            Value::NaN
        } else if x.is_infinite() {
            Value::Infinite {
                negative: x.is_sign_negative(),
            }
        } else {
            rational_from_f64(x).map_or(Value::NaN, Value::Finite)
        };
        self.store(value)
    }

    pub fn set_i64(&mut self, x: i64) -> &mut Self {
        self.set_integer(&BigInt::from(x))
    }

    pub fn set_u64(&mut self, x: u64) -> &mut Self {
        self.set_integer(&BigInt::from(x))
    }

    pub fn set_integer(&mut self, x: &BigInt) -> &mut Self {
        self.store(Value::Finite(BigRational::from_integer(x.clone())))
    }

    pub fn set_rational(&mut self, x: &BigRational) -> &mut Self {
        self.store(Value::Finite(x.clone()))
    }

    /// Sets `-inf` if `signbit`, `+inf` otherwise.
    pub fn set_inf(&mut self, signbit: bool) -> &mut Self {
        self.store(Value::Infinite { negative: signbit })
    }

    /// Parses `s` in this number's base and stores it rounded onto the grid.
    ///
    /// Accepts `[+-]digits[.digits]` plus `inf`, `infinity` and `nan` in any
    /// case, with an optional sign on the infinities.
    ///
    /// # Errors
    /// Returns `InvalidInput` for anything else; the value is left unchanged.
    pub fn set_str(&mut self, s: &str) -> NumericResult<&mut Self> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let value = match lower.as_str() {
            "inf" | "+inf" | "infinity" | "+infinity" => Value::Infinite { negative: false },
            "-inf" | "-infinity" => Value::Infinite { negative: true },
            "nan" => Value::NaN,
            _ => Value::Finite(parse_radix(trimmed, self.base)?),
        };
        Ok(self.store(value))
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    fn check_family(&self, rhs: &Self) -> NumericResult<()> {
        if self.prec == rhs.prec && self.base == rhs.base {
            Ok(())
        } else {
            Err(NumericError::ScaleMismatch)
        }
    }

    /// Exact sum rounded onto the grid.
    ///
    /// # Errors
    /// Returns `ScaleMismatch` if the operands differ in precision or base.
    pub fn checked_add(&self, rhs: &Self) -> NumericResult<Self> {
        self.check_family(rhs)?;
        Ok(self.sibling(add_values(&self.value, &rhs.value)))
    }

    /// Exact difference rounded onto the grid.
    pub fn checked_sub(&self, rhs: &Self) -> NumericResult<Self> {
        self.check_family(rhs)?;
        Ok(self.sibling(add_values(&self.value, &neg_value(&rhs.value))))
    }

    /// Exact product rounded onto the grid.
    pub fn checked_mul(&self, rhs: &Self) -> NumericResult<Self> {
        self.check_family(rhs)?;
        Ok(self.sibling(mul_values(&self.value, &rhs.value)))
    }

    /// Exact quotient rounded onto the grid.
    ///
    /// Division of a non-zero value by zero yields an infinity carrying the
    /// dividend's sign; `0 / 0` and `inf / inf` yield NaN.
    pub fn checked_quo(&self, rhs: &Self) -> NumericResult<Self> {
        self.check_family(rhs)?;
        Ok(self.sibling(quo_values(&self.value, &rhs.value)))
    }

    pub fn neg(&self) -> Self {
        self.sibling(neg_value(&self.value))
    }

    pub fn abs(&self) -> Self {
        let value = match &self.value {
            Value::Finite(v) => Value::Finite(v.abs()),
            Value::Infinite { .. } => Value::Infinite { negative: false },
            Value::NaN => Value::NaN,
        };
        self.sibling(value)
    }

    /// Square root rounded half away from zero onto the grid.
    ///
    /// Negative values and `-inf` give NaN.
    pub fn sqrt(&self) -> Self {
        let value = match &self.value {
            Value::Finite(v) if v.is_negative() => Value::NaN,
            Value::Finite(v) => Value::Finite(self.grid_sqrt(v)),
            Value::Infinite { negative: false } => Value::Infinite { negative: false },
            Value::Infinite { negative: true } | Value::NaN => Value::NaN,
        };
        self.sibling(value)
    }

    /// round(sqrt(v) * k) / k for v >= 0, computed on integers only.
    fn grid_sqrt(&self, v: &BigRational) -> BigRational {
        // sqrt(v) * k = sqrt(v * k^2) = sqrt(p / q)
        let t = v * &self.scale * &self.scale;
        let (p, q) = (t.numer(), t.denom());
        let floor_root = (p * q).sqrt() / q;

        // Round up when t >= (floor_root + 1/2)^2 = (2 * floor_root + 1)^2 / 4
        let odd = &floor_root * BigInt::from(2) + BigInt::one();
        let midpoint_sq = BigRational::new(&odd * &odd, BigInt::from(4));
        let rounded = if t >= midpoint_sq {
            floor_root + BigInt::one()
        } else {
            floor_root
        };
        BigRational::from_integer(rounded) / &self.scale
    }

    // ========================================================================
    // Conversion
    // ========================================================================

    /// Nearest double and whether it equals, exceeds or falls short of the
    /// stored value. Infinities and NaN convert as `Exact`.
    pub fn to_f64(&self) -> (f64, Exactness) {
        match &self.value {
            Value::Finite(v) => rational_to_f64(v),
            Value::Infinite { negative: false } => (f64::INFINITY, Exactness::Exact),
            Value::Infinite { negative: true } => (f64::NEG_INFINITY, Exactness::Exact),
            Value::NaN => (f64::NAN, Exactness::Exact),
        }
    }

    /// Nearest `f32`, rounded once from the exact value, with the direction
    /// of the rounding. Infinities and NaN convert as `Exact`.
    pub fn to_f32(&self) -> (f32, Exactness) {
        match &self.value {
            Value::Finite(v) => rational_to_f32(v),
            Value::Infinite { negative: false } => (f32::INFINITY, Exactness::Exact),
            Value::Infinite { negative: true } => (f32::NEG_INFINITY, Exactness::Exact),
            Value::NaN => (f32::NAN, Exactness::Exact),
        }
    }

    /// Value truncated toward zero; `None` for infinities and NaN.
    pub fn to_integer(&self) -> Option<(BigInt, Exactness)> {
        self.as_rational().map(trunc)
    }

    /// Value truncated toward zero and clamped to `i64`; infinities clamp
    /// like out-of-range values. `None` for NaN.
    pub fn to_i64(&self) -> Option<(i64, Exactness)> {
        match &self.value {
            Value::Finite(v) => Some(rounding::to_i64(v)),
            Value::Infinite { negative: false } => Some((i64::MAX, Exactness::RoundedDown)),
            Value::Infinite { negative: true } => Some((i64::MIN, Exactness::RoundedUp)),
            Value::NaN => None,
        }
    }

    /// Value truncated toward zero and clamped to `u64`. `None` for NaN.
    pub fn to_u64(&self) -> Option<(u64, Exactness)> {
        match &self.value {
            Value::Finite(v) => Some(rounding::to_u64(v)),
            Value::Infinite { negative: false } => Some((u64::MAX, Exactness::RoundedDown)),
            Value::Infinite { negative: true } => Some((0, Exactness::RoundedUp)),
            Value::NaN => None,
        }
    }
}

// ============================================================================
// Special-Value Arithmetic
// ============================================================================

fn neg_value(x: &Value) -> Value {
    match x {
        Value::Finite(v) => Value::Finite(-v),
        Value::Infinite { negative } => Value::Infinite {
            negative: !negative,
        },
        Value::NaN => Value::NaN,
    }
}

fn add_values(x: &Value, y: &Value) -> Value {
    match (x, y) {
        (Value::Finite(a), Value::Finite(b)) => Value::Finite(a + b),
        (Value::Infinite { negative: a }, Value::Infinite { negative: b }) => {
            if a == b {
                Value::Infinite { negative: *a }
            } else {
                Value::NaN
            }
        },
        (inf @ Value::Infinite { .. }, Value::Finite(_))
        | (Value::Finite(_), inf @ Value::Infinite { .. }) => inf.clone(),
        _ => Value::NaN,
    }
}

fn mul_values(x: &Value, y: &Value) -> Value {
    match (x, y) {
        (Value::Finite(a), Value::Finite(b)) => Value::Finite(a * b),
        (Value::Infinite { negative: a }, Value::Infinite { negative: b }) => {
            Value::Infinite { negative: a != b }
        },
        (Value::Infinite { negative }, Value::Finite(f))
        | (Value::Finite(f), Value::Infinite { negative }) => {
            if f.is_zero() {
                Value::NaN
            } else {
                Value::Infinite {
                    negative: *negative != f.is_negative(),
                }
            }
        },
        _ => Value::NaN,
    }
}

fn quo_values(x: &Value, y: &Value) -> Value {
    match (x, y) {
        (Value::Finite(a), Value::Finite(b)) => {
            if !b.is_zero() {
                Value::Finite(a / b)
            } else if a.is_zero() {
                Value::NaN
            } else {
                Value::Infinite {
                    negative: a.is_negative(),
                }
            }
        },
        (Value::Finite(_), Value::Infinite { .. }) => Value::Finite(BigRational::zero()),
        (Value::Infinite { negative }, Value::Finite(b)) => Value::Infinite {
            negative: *negative != b.is_negative(),
        },
        _ => Value::NaN,
    }
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl Default for Number {
    /// Zero with precision 0 in base 10.
    fn default() -> Self {
        Self::decimal(0)
    }
}

impl PartialEq for Number {
    /// Compares values only; NaN is never equal to anything.
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Number {
    /// Same order as [`Number::compare`].
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

impl Neg for Number {
    type Output = Number;

    #[inline]
    fn neg(self) -> Self::Output {
        Number::neg(&self)
    }
}

impl Neg for &Number {
    type Output = Number;

    #[inline]
    fn neg(self) -> Self::Output {
        Number::neg(self)
    }
}

// Infallible operators for ergonomics (panic on mismatched precision or base;
// use checked_* when operands come from different sources)
macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $checked:ident, $what:literal) => {
        impl $trait<&Number> for &Number {
            type Output = Number;

            #[inline]
            fn $method(self, rhs: &Number) -> Self::Output {
                self.$checked(rhs)
                    .expect(concat!("Number ", $what, " with mismatched precision or base"))
            }
        }

        impl $trait for Number {
            type Output = Number;

            #[inline]
            fn $method(self, rhs: Number) -> Self::Output {
                (&self).$method(&rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, checked_add, "addition");
impl_binary_op!(Sub, sub, checked_sub, "subtraction");
impl_binary_op!(Mul, mul, checked_mul, "multiplication");
impl_binary_op!(Div, div, checked_quo, "division");

// ============================================================================
// Display and Debug
// ============================================================================

impl fmt::Display for Number {
    /// Exact value in the number's base with trailing fractional zeros
    /// removed; `{:.N}` forces exactly N fractional digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Finite(v) => {
                let text = match f.precision() {
                    Some(digits) => format_fixed(v, self.base, digits as u32),
                    None => format_trimmed(v, self.base, self.prec.max(0) as u32),
                };
                f.write_str(&text)
            },
            Value::Infinite { negative: false } => f.write_str("+Inf"),
            Value::Infinite { negative: true } => f.write_str("-Inf"),
            Value::NaN => f.write_str("NaN"),
        }
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Number<prec={}, base={}>({})",
            self.prec, self.base, self
        )
    }
}

// ============================================================================
// Conversion from rust_decimal (for API boundaries)
// ============================================================================

impl Number {
    /// Converts a `rust_decimal::Decimal` onto the grid.
    ///
    /// # Errors
    /// - `InvalidBase` for a base outside 2..=36
    /// - `PrecisionLoss` if the decimal is not a grid point
    pub fn from_decimal(d: rust_decimal::Decimal, prec: i32, base: u32) -> NumericResult<Self> {
        let exact = BigRational::new(BigInt::from(d.mantissa()), radix_power(10, d.scale()));
        let n = Self::from_rational(&exact, prec, base)?;
        if n.as_rational() != Some(&exact) {
            return Err(NumericError::PrecisionLoss);
        }
        Ok(n)
    }

    /// Converts to `rust_decimal::Decimal` using the smallest exact scale.
    ///
    /// # Errors
    /// - `InvalidInput` for infinities and NaN
    /// - `PrecisionLoss` if no scale up to 28 represents the value exactly
    /// - `Overflow` if the mantissa exceeds 96 bits
    pub fn to_decimal(&self) -> NumericResult<rust_decimal::Decimal> {
        let value = self.as_rational().ok_or(NumericError::InvalidInput)?;
        for scale in 0..=DECIMAL_MAX_SCALE {
            let scaled = value * BigRational::from_integer(radix_power(10, scale));
            if scaled.is_integer() {
                let mantissa =
                    i128::try_from(scaled.to_integer()).map_err(|_| NumericError::Overflow)?;
                return rust_decimal::Decimal::try_from_i128_with_scale(mantissa, scale)
                    .map_err(|_| NumericError::Overflow);
            }
        }
        Err(NumericError::PrecisionLoss)
    }
}

// ============================================================================
// Tests
// ============================================================================
