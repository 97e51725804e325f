// ============================================================================
// IEEE-754 Bridge
// Lossless f64 -> rational lifting and correctly rounded rational -> f64/f32
// ============================================================================

use super::exactness::Exactness;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::ops::Neg;

/// Lifts a finite double into an exact rational.
///
/// Returns `None` for infinities and NaN. Both zeros map to `0`.
#[inline]
pub fn rational_from_f64(x: f64) -> Option<BigRational> {
    if !x.is_finite() {
        return None;
    }
    BigRational::from_float(x)
}

// ============================================================================
// Correctly Rounded Narrowing
// ============================================================================

/// IEEE-754 binary formats a rational can be rounded into.
trait BinaryFloat: Copy + Neg<Output = Self> {
    const MAX: Self;
    const INFINITY: Self;
    const ZERO: Self;
    /// Overflow threshold is `2^TOP - 2^HALF_ULP`, the midpoint between
    /// `MAX` and the first power of two past it.
    const TOP: u32;
    const HALF_ULP: u32;

    /// Finite starting guess near `x`.
    fn approx(x: &BigRational) -> Self;
    fn up(self) -> Self;
    fn down(self) -> Self;
    fn infinite(self) -> bool;
    fn even(self) -> bool;
    /// Exact value; callers guarantee finiteness.
    fn exact(self) -> BigRational;
}

macro_rules! impl_binary_float {
    ($t:ty, $top:expr, $half_ulp:expr) => {
        impl BinaryFloat for $t {
            const MAX: Self = <$t>::MAX;
            const INFINITY: Self = <$t>::INFINITY;
            const ZERO: Self = 0.0;
            const TOP: u32 = $top;
            const HALF_ULP: u32 = $half_ulp;

            fn approx(x: &BigRational) -> Self {
                x.to_f64()
                    .map(|v| v as $t)
                    .filter(|v| v.is_finite())
                    .unwrap_or(<$t>::MAX)
            }

            #[inline]
            fn up(self) -> Self {
                <$t>::next_up(self)
            }

            #[inline]
            fn down(self) -> Self {
                <$t>::next_down(self)
            }

            #[inline]
            fn infinite(self) -> bool {
                <$t>::is_infinite(self)
            }

            #[inline]
            fn even(self) -> bool {
                self.to_bits() & 1 == 0
            }

            fn exact(self) -> BigRational {
                BigRational::from_float(self).unwrap_or_else(BigRational::one)
            }
        }
    };
}

impl_binary_float!(f64, 1024, 970);
impl_binary_float!(f32, 128, 103);

fn nearest<F: BinaryFloat>(x: &BigRational) -> (F, Exactness) {
    if x.is_zero() {
        return (F::ZERO, Exactness::Exact);
    }
    if x.is_negative() {
        let (value, exactness) = nearest::<F>(&-x);
        return (-value, exactness.flip());
    }

    let two = BigInt::from(2);
    let threshold = BigRational::from_integer(two.pow(F::TOP) - two.pow(F::HALF_ULP));
    if *x >= threshold {
        return (F::INFINITY, Exactness::RoundedUp);
    }

    // Start from the library approximation, then settle on the exact pair of
    // adjacent values `lo <= x < hi`.
    let mut lo = F::approx(x);
    while lo.exact() > *x {
        lo = lo.down();
    }
    loop {
        let next = lo.up();
        if next.infinite() || next.exact() > *x {
            break;
        }
        lo = next;
    }

    let lo_exact = lo.exact();
    if lo_exact == *x {
        return (lo, Exactness::Exact);
    }

    let hi = lo.up();
    if hi.infinite() {
        // Below the overflow threshold, so the nearest value is MAX.
        return (F::MAX, Exactness::RoundedDown);
    }

    let below = x - &lo_exact;
    let above = hi.exact() - x;
    if below < above || (below == above && lo.even()) {
        (lo, Exactness::RoundedDown)
    } else {
        (hi, Exactness::RoundedUp)
    }
}

/// Nearest double to `x`, ties to even, with the direction of the rounding.
///
/// Magnitudes at or beyond the IEEE-754 overflow threshold become infinities.
#[inline]
pub fn rational_to_f64(x: &BigRational) -> (f64, Exactness) {
    nearest(x)
}

/// Nearest `f32` to `x`, rounded once from the exact value (no detour
/// through `f64`), ties to even.
#[inline]
pub fn rational_to_f32(x: &BigRational) -> (f32, Exactness) {
    nearest(x)
}

/// Exact distance from `x` to the next double above it.
///
/// `None` if `x` is not finite or the neighbour is `+inf`.
pub fn gap_above(x: f64) -> Option<BigRational> {
    let next = x.next_up();
    Some(rational_from_f64(next)? - rational_from_f64(x)?)
}

/// Exact distance from `x` to the next double below it.
///
/// `None` if `x` is not finite or the neighbour is `-inf`.
pub fn gap_below(x: f64) -> Option<BigRational> {
    let next = x.next_down();
    Some(rational_from_f64(x)? - rational_from_f64(next)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    fn rat(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_rational_from_f64() {
        assert_eq!(rational_from_f64(0.5), Some(rat(1, 2)));
        assert_eq!(rational_from_f64(-6.375), Some(rat(-51, 8)));
        assert_eq!(rational_from_f64(-0.0), Some(BigRational::zero()));
        assert_eq!(rational_from_f64(f64::INFINITY), None);
        assert_eq!(rational_from_f64(f64::NAN), None);
    }

    #[test]
    fn test_decimal_fractions_are_inexact() {
        // 0.1 has no finite binary expansion
        assert_eq!(rational_to_f64(&rat(1, 10)), (0.1, Exactness::RoundedUp));
        assert_eq!(rational_to_f64(&rat(-1, 10)), (-0.1, Exactness::RoundedDown));
        let (value, _) = rational_to_f64(&rat(301, 100));
        assert_eq!(value, 3.01);
    }

    #[test]
    fn test_ties_to_even() {
        // 2^53 + 1 sits halfway between 2^53 and 2^53 + 2
        let two53 = BigInt::from(1u64 << 53);
        let halfway = BigRational::from_integer(&two53 + BigInt::one());
        assert_eq!(
            rational_to_f64(&halfway),
            (9007199254740992.0, Exactness::RoundedDown)
        );
        // 2^53 + 3 sits halfway between 2^53 + 2 and 2^53 + 4
        let halfway = BigRational::from_integer(&two53 + BigInt::from(3));
        assert_eq!(
            rational_to_f64(&halfway),
            (9007199254740996.0, Exactness::RoundedUp)
        );
    }

    #[test]
    fn test_overflow() {
        let max = rational_from_f64(f64::MAX).unwrap();
        assert_eq!(rational_to_f64(&max), (f64::MAX, Exactness::Exact));

        let just_above = &max + BigRational::one();
        assert_eq!(rational_to_f64(&just_above), (f64::MAX, Exactness::RoundedDown));

        let huge = BigRational::from_integer(BigInt::from(2).pow(1100u32));
        assert_eq!(rational_to_f64(&huge), (f64::INFINITY, Exactness::RoundedUp));
        assert_eq!(rational_to_f64(&-huge), (f64::NEG_INFINITY, Exactness::RoundedDown));
    }

    #[test]
    fn test_subnormal() {
        let tiny = f64::from_bits(1);
        let exact = rational_from_f64(tiny).unwrap();
        assert_eq!(rational_to_f64(&exact), (tiny, Exactness::Exact));

        let below_half = &exact / BigRational::from_integer(BigInt::from(3));
        assert_eq!(rational_to_f64(&below_half), (0.0, Exactness::RoundedDown));
    }

    #[test]
    fn test_f32_rounds_once() {
        assert_eq!(rational_to_f32(&rat(1, 10)), (0.1f32, Exactness::RoundedUp));
        assert_eq!(rational_to_f32(&rat(-3, 8)), (-0.375f32, Exactness::Exact));

        // 1 + 2^-24 + 2^-60 lies just above the midpoint of 1 and 1 + 2^-23.
        // Going through f64 first would drop the 2^-60 and land on 1.0.
        let two = BigInt::from(2);
        let one = BigRational::one();
        let half_ulp = BigRational::new(BigInt::one(), two.pow(24u32));
        let nudge = BigRational::new(BigInt::one(), two.pow(60u32));
        let x = &one + &half_ulp + &nudge;
        assert_eq!(rational_to_f32(&x), (1.0 + f32::EPSILON, Exactness::RoundedUp));

        // The exact midpoint ties to even
        assert_eq!(rational_to_f32(&(&one + &half_ulp)), (1.0, Exactness::RoundedDown));
    }

    #[test]
    fn test_f32_overflow() {
        let max = BigRational::from_float(f32::MAX).unwrap();
        assert_eq!(rational_to_f32(&max), (f32::MAX, Exactness::Exact));
        assert_eq!(
            rational_to_f32(&(&max + BigRational::one())),
            (f32::MAX, Exactness::RoundedDown)
        );

        let huge = BigRational::from_integer(BigInt::from(2).pow(128u32));
        assert_eq!(rational_to_f32(&huge), (f32::INFINITY, Exactness::RoundedUp));
        assert_eq!(rational_to_f32(&-huge), (f32::NEG_INFINITY, Exactness::RoundedDown));

        let tiny = BigRational::from_float(f32::from_bits(1)).unwrap();
        assert_eq!(rational_to_f32(&tiny), (f32::from_bits(1), Exactness::Exact));
    }

    #[test]
    fn test_gaps() {
        assert_eq!(gap_above(1.0), rational_from_f64(f64::EPSILON));
        assert_eq!(gap_below(1.0), rational_from_f64(f64::EPSILON / 2.0));
        assert_eq!(gap_above(f64::MAX), None);
        assert_eq!(gap_below(f64::INFINITY), None);
    }

    quickcheck! {
        fn qc_round_trip(x: f64) -> bool {
            match rational_from_f64(x) {
                Some(r) => {
                    let (back, exactness) = rational_to_f64(&r);
                    back == x && exactness.is_exact()
                }
                None => !x.is_finite(),
            }
        }

        fn qc_nearest_of_ratio(n: i64, d: i64) -> bool {
            if d == 0 {
                return true;
            }
            let x = BigRational::new(BigInt::from(n), BigInt::from(d));
            let (value, exactness) = rational_to_f64(&x);
            let exact_value = rational_from_f64(value).unwrap();
            Exactness::from_ordering(exact_value.cmp(&x)) == exactness
        }
    }
}
