// ============================================================================
// Stepper
// Evenly spaced, exactly representable grid over a (possibly open) range
// ============================================================================

use super::config::StepperConfig;
use super::errors::{StepperError, StepperResult};
use crate::numeric::float::{gap_above, gap_below, rational_from_f64};
use crate::numeric::rounding::{clamp_integer, round};
use crate::numeric::{check_base, Exactness, Number};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// Maps integer indices to doubles on a grid of `step`-spaced points and
/// snaps doubles back onto it.
///
/// The grid runs from `min` to `max` inclusive. Either bound may be infinite
/// (`max = +inf`, `min = -inf`), which leaves the grid open on that side.
/// Index 0 sits on the anchor: `min` when finite, otherwise `max` when
/// finite, otherwise zero.
///
/// Construction validates that step and bounds are grid values whose
/// neighbouring doubles lie less than one step away. A bounded grid is also
/// checked so that every point converts to an `f64` and back without loss:
/// either doubles in range are closer than one grid unit, or every point is
/// itself an exact double.
///
/// A built `Stepper` is immutable and can be shared across threads.
///
/// # Example
/// ```
/// use stepgrid::stepper::{Stepper, StepperError};
///
/// let s = Stepper::new(2, 10, 0.1, 3.01, 2.31).unwrap();
/// assert_eq!(s.count64().0, 8);
/// assert_eq!(s.step(7), Ok(3.01));
/// assert_eq!(s.step(8), Err(StepperError::MaxExceeded { max: 3.01 }));
/// assert_eq!(s.normalize(2.5549), Ok(2.51));
/// ```
#[derive(Debug, Clone)]
pub struct Stepper {
    step: Number,
    max: Number,
    min: Number,
    /// Exact value of index 0
    anchor: BigRational,
    /// Exact step
    stride: BigRational,
    /// Number of grid points; zero when a bound is infinite
    count: BigInt,
    step_f64: f64,
    max_f64: f64,
    min_f64: f64,
}

#[derive(Clone, Copy)]
enum Side {
    Max,
    Min,
}

impl Stepper {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Builds a grid of `step`-spaced points from `min` to `max` at the given
    /// precision and base.
    ///
    /// # Errors
    /// - `InvalidBase` for a base outside 2..=36
    /// - `StepOverflow` if `step` is not a positive finite grid value
    /// - `MaxOverflow` / `MinOverflow` if a bound is not a grid value, its
    ///   neighbouring double lies a step or more away, or a bounded grid has
    ///   points that would not survive the trip through `f64`
    /// - `RangeOverflow` if `max - min` is not a whole number of steps, or
    ///   both bounds are the same infinity
    /// - `UnorderedMaxMin` if `max < min`
    pub fn new(prec: i32, base: u32, step: f64, max: f64, min: f64) -> StepperResult<Self> {
        let result = Self::build(prec, base, step, max, min);
        match &result {
            Ok(stepper) => tracing::debug!(
                prec,
                base,
                step,
                max,
                min,
                count = %stepper.count,
                "stepper built"
            ),
            Err(err) => tracing::debug!(
                prec,
                base,
                step,
                max,
                min,
                error = %err,
                "stepper rejected"
            ),
        }
        result
    }

    fn build(prec: i32, base: u32, step: f64, max: f64, min: f64) -> StepperResult<Self> {
        check_base(base).map_err(|_| StepperError::InvalidBase(base))?;

        if !step.is_finite() || step <= 0.0 {
            return Err(StepperError::StepOverflow);
        }
        let step_n = grid_value(step, prec, base).ok_or(StepperError::StepOverflow)?;
        let stride = step_n.to_rational().ok_or(StepperError::StepOverflow)?;

        let (max_n, max_gap) =
            grid_bound(max, prec, base, Side::Max, &stride).ok_or(StepperError::MaxOverflow)?;
        let (min_n, min_gap) =
            grid_bound(min, prec, base, Side::Min, &stride).ok_or(StepperError::MinOverflow)?;

        if max_n.is_inf() && min_n.is_inf() && max_n.is_negative() == min_n.is_negative() {
            return Err(StepperError::RangeOverflow);
        }

        let interval = &max_n - &min_n;
        let count = match interval.as_rational() {
            Some(span) => {
                let ratio = span / &stride;
                if ratio.is_negative() {
                    return Err(StepperError::UnorderedMaxMin);
                }
                if !ratio.is_integer() {
                    return Err(StepperError::RangeOverflow);
                }
                ratio.to_integer() + BigInt::one()
            },
            None => {
                if interval.is_negative() {
                    return Err(StepperError::UnorderedMaxMin);
                }
                BigInt::zero()
            },
        };

        // Every point of a bounded grid must come back from f64 unchanged.
        // The widest spacing of doubles in range sits at the outward side of
        // the larger bound.
        if let (Some(max_gap), Some(min_gap)) = (&max_gap, &min_gap) {
            let (gap, bound, raw, err) = if max_gap >= min_gap {
                (max_gap, &max_n, max, StepperError::MaxOverflow)
            } else {
                (min_gap, &min_n, min, StepperError::MinOverflow)
            };
            if *gap >= step_n.unit() && !points_are_doubles(&stride, gap, bound, raw) {
                return Err(err);
            }
        }

        let anchor = min_n
            .to_rational()
            .or_else(|| max_n.to_rational())
            .unwrap_or_else(BigRational::zero);

        Ok(Self {
            step: step_n,
            max: max_n,
            min: min_n,
            anchor,
            stride,
            count,
            step_f64: step,
            max_f64: max,
            min_f64: min,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn prec(&self) -> i32 {
        self.step.prec()
    }

    #[inline]
    pub fn base(&self) -> u32 {
        self.step.base()
    }

    #[inline]
    pub fn step_value(&self) -> f64 {
        self.step_f64
    }

    #[inline]
    pub fn max(&self) -> f64 {
        self.max_f64
    }

    #[inline]
    pub fn min(&self) -> f64 {
        self.min_f64
    }

    /// Number of grid points, or zero for an unbounded grid.
    #[inline]
    pub fn count(&self) -> &BigInt {
        &self.count
    }

    /// `count()` clamped to `i64`.
    pub fn count64(&self) -> (i64, Exactness) {
        clamp_integer(self.count.clone(), Exactness::Exact, i64::MIN, i64::MAX)
    }

    /// True when both bounds are finite.
    #[inline]
    pub fn is_bounded(&self) -> bool {
        self.max.is_finite() && self.min.is_finite()
    }

    /// The configuration this stepper was built from.
    pub fn config(&self) -> StepperConfig {
        StepperConfig::new(self.prec(), self.base(), self.step_f64)
            .with_range(self.min_f64, self.max_f64)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Value of grid point `index`.
    ///
    /// # Errors
    /// `MinExceeded` / `MaxExceeded` with the bound when `index` falls past a
    /// finite bound.
    #[inline]
    pub fn step(&self, index: i64) -> StepperResult<f64> {
        self.step_big(&BigInt::from(index))
    }

    /// [`Stepper::step`] for indices beyond `i64`.
    ///
    /// # Panics
    /// Panics if a point of a bounded grid fails to survive conversion to
    /// `f64`, which construction rules out.
    pub fn step_big(&self, index: &BigInt) -> StepperResult<f64> {
        self.check_index(index)?;

        let exact = &self.anchor + &self.stride * BigRational::from_integer(index.clone());
        let mut point = self.step.clone();
        point.set_rational(&exact);

        let (value, _) = point.to_f64();
        let mut back = self.step.clone();
        back.set_f64(value);
        if back == point {
            return Ok(value);
        }

        if self.is_bounded() {
            tracing::error!(%index, %point, value, "grid point lost exactness");
            panic!(
                "stepper invariant violated: grid point {} (index {}) has no exact f64",
                point, index
            );
        }
        // Open grids have no bound keeping points inside f64 resolution.
        tracing::trace!(%index, %point, value, "grid point beyond f64 resolution");
        Ok(value)
    }

    /// Snaps `value` to the nearest grid point, ties away from the anchor.
    ///
    /// NaN passes through. Infinities pass through on open sides; an infinity
    /// toward a finite bound is reported as `MaxExceeded` / `MinExceeded`
    /// carrying that bound rather than returned as is.
    ///
    /// # Errors
    /// `MinExceeded` / `MaxExceeded` with the bound when the nearest point
    /// lies past a finite bound.
    pub fn normalize(&self, value: f64) -> StepperResult<f64> {
        if value.is_nan() {
            return Ok(value);
        }
        let Some(exact) = rational_from_f64(value) else {
            if value > 0.0 && self.max.is_finite() {
                return Err(StepperError::MaxExceeded { max: self.max_f64 });
            }
            if value < 0.0 && self.min.is_finite() {
                return Err(StepperError::MinExceeded { min: self.min_f64 });
            }
            return Ok(value);
        };

        let index = round(&((exact - &self.anchor) / &self.stride));
        self.step_big(&index)
    }

    fn check_index(&self, index: &BigInt) -> StepperResult<()> {
        if self.min.is_finite() {
            if index.is_negative() {
                return Err(StepperError::MinExceeded { min: self.min_f64 });
            }
            if self.max.is_finite() && *index >= self.count {
                return Err(StepperError::MaxExceeded { max: self.max_f64 });
            }
        } else if self.max.is_finite() && index.is_positive() {
            // Anchored on max: the grid grows downward only
            return Err(StepperError::MaxExceeded { max: self.max_f64 });
        }
        Ok(())
    }
}

/// `x` as a grid number, if it converts back to exactly `x`.
fn grid_value(x: f64, prec: i32, base: u32) -> Option<Number> {
    let n = Number::from_f64(x, prec, base).ok()?;
    (n.to_f64().0 == x).then_some(n)
}

/// `x` as a grid bound, with the distance to its outward neighbouring double
/// (`None` for an infinite bound). Rejects bounds whose neighbour lies a full
/// step or more away.
fn grid_bound(
    x: f64,
    prec: i32,
    base: u32,
    side: Side,
    stride: &BigRational,
) -> Option<(Number, Option<BigRational>)> {
    let n = grid_value(x, prec, base)?;
    if n.is_inf() {
        return Some((n, None));
    }
    let gap = match side {
        Side::Max => gap_above(x)?,
        Side::Min => gap_below(x)?,
    };
    (gap < *stride).then_some((n, Some(gap)))
}

/// True when `bound` is exactly the double `raw` and `stride` is a whole
/// number of `gap`. Every double is a multiple of its neighbour gaps, so all
/// points then land on multiples of the widest spacing in range.
fn points_are_doubles(stride: &BigRational, gap: &BigRational, bound: &Number, raw: f64) -> bool {
    (stride / gap).is_integer() && bound.as_rational() == rational_from_f64(raw).as_ref()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    const INF: f64 = f64::INFINITY;

    #[test]
    fn test_new_outcomes() {
        assert!(Stepper::new(2, 10, 0.1, 3.01, 2.31).is_ok());
        assert_eq!(
            Stepper::new(2, 10, 0.105, 3.01, 2.31).unwrap_err(),
            StepperError::StepOverflow
        );
        assert_eq!(
            Stepper::new(2, 10, 0.1, 3.015, 2.31).unwrap_err(),
            StepperError::MaxOverflow
        );
        assert_eq!(
            Stepper::new(2, 10, 0.1, 3.01, 2.315).unwrap_err(),
            StepperError::MinOverflow
        );
        assert_eq!(
            Stepper::new(2, 10, 0.15, 3.01, 2.31).unwrap_err(),
            StepperError::RangeOverflow
        );
        assert_eq!(
            Stepper::new(2, 10, 0.1, 2.31, 3.01).unwrap_err(),
            StepperError::UnorderedMaxMin
        );
        assert!(Stepper::new(2, 10, 0.1, INF, -INF).is_ok());
        assert_eq!(
            Stepper::new(2, 10, 0.1, -INF, INF).unwrap_err(),
            StepperError::UnorderedMaxMin
        );
    }

    #[test]
    fn test_invalid_base() {
        assert_eq!(
            Stepper::new(2, 1, 0.1, 3.01, 2.31).unwrap_err(),
            StepperError::InvalidBase(1)
        );
        assert_eq!(
            Stepper::new(2, 37, 0.1, 3.01, 2.31).unwrap_err(),
            StepperError::InvalidBase(37)
        );
    }

    #[test]
    fn test_invalid_step() {
        for step in [0.0, -0.1, f64::NAN, INF, -INF] {
            assert_eq!(
                Stepper::new(2, 10, step, 3.01, 2.31).unwrap_err(),
                StepperError::StepOverflow,
                "step {}",
                step
            );
        }
        // Rounds to zero at precision 2
        assert_eq!(
            Stepper::new(2, 10, 0.001, 3.01, 2.31).unwrap_err(),
            StepperError::StepOverflow
        );
    }

    #[test]
    fn test_same_infinities() {
        assert_eq!(
            Stepper::new(2, 10, 0.1, INF, INF).unwrap_err(),
            StepperError::RangeOverflow
        );
        assert_eq!(
            Stepper::new(2, 10, 0.1, -INF, -INF).unwrap_err(),
            StepperError::RangeOverflow
        );
        assert_eq!(
            Stepper::new(2, 10, 0.1, -INF, 1.0).unwrap_err(),
            StepperError::UnorderedMaxMin
        );
        assert_eq!(
            Stepper::new(2, 10, 0.1, 1.0, INF).unwrap_err(),
            StepperError::UnorderedMaxMin
        );
    }

    #[test]
    fn test_bounds_too_coarse() {
        // Doubles near 1e20 are 16384 apart
        assert_eq!(
            Stepper::new(2, 10, 0.1, 1e20, 0.0).unwrap_err(),
            StepperError::MaxOverflow
        );
        assert_eq!(
            Stepper::new(2, 10, 0.1, 0.0, -1e20).unwrap_err(),
            StepperError::MinOverflow
        );
        // Next double above f64::MAX is infinite
        assert_eq!(
            Stepper::new(0, 2, 1.0, f64::MAX, 0.0).unwrap_err(),
            StepperError::MaxOverflow
        );
        assert_eq!(
            Stepper::new(2, 10, 0.1, f64::NAN, 0.0).unwrap_err(),
            StepperError::MaxOverflow
        );
        assert_eq!(
            Stepper::new(2, 10, 0.1, 1.0, f64::NAN).unwrap_err(),
            StepperError::MinOverflow
        );
    }

    #[test]
    fn test_coarse_doubles_with_exact_points() {
        // Doubles near 1e14 are 1/64 apart: coarser than the 0.01 unit, but
        // every integer in range is an exact double
        let s = Stepper::new(2, 10, 1.0, 1e14, 1e14 - 10.0).unwrap();
        assert_eq!(s.count64(), (11, Exactness::Exact));
        for i in 0..11 {
            let value = s.step(i).unwrap();
            assert_eq!(value, 1e14 - 10.0 + i as f64);
            assert_eq!(s.normalize(value), Ok(value));
        }
        assert_eq!(s.normalize(1e14 - 3.4), Ok(1e14 - 3.0));

        // Same grid at precision 0 agrees
        let s0 = Stepper::new(0, 10, 1.0, 1e14, 1e14 - 10.0).unwrap();
        assert_eq!(s0.count(), s.count());

        // Spacing 1/32 above 2^47 divides a quarter step
        let two47 = (1u64 << 47) as f64;
        let s = Stepper::new(2, 10, 0.25, two47 + 1.0, two47).unwrap();
        assert_eq!(s.count64(), (5, Exactness::Exact));
        assert_eq!(s.step(1), Ok(two47 + 0.25));
        assert_eq!(s.step(4), Ok(two47 + 1.0));
    }

    #[test]
    fn test_coarse_doubles_with_inexact_points() {
        // 0.1 is not a whole number of 1/64, so points between the bounds
        // would not come back from f64
        assert_eq!(
            Stepper::new(2, 10, 0.1, 1e14, 1e14 - 10.0).unwrap_err(),
            StepperError::MaxOverflow
        );
        // Widest spacing (1/32) sits below min here
        let two47 = (1u64 << 47) as f64;
        assert_eq!(
            Stepper::new(2, 10, 0.1, -two47, -two47 - 1.0).unwrap_err(),
            StepperError::MinOverflow
        );
        // Neighbouring double a full step away
        assert_eq!(
            Stepper::new(2, 10, 0.01, 1e14, 1e14 - 1.0).unwrap_err(),
            StepperError::MaxOverflow
        );
    }

    #[test]
    fn test_negative_precision() {
        let s = Stepper::new(-1, 10, 10.0, 100.0, 0.0).unwrap();
        assert_eq!(s.prec(), -1);
        assert_eq!(s.count64(), (11, Exactness::Exact));
        assert_eq!(s.step(3), Ok(30.0));
        assert_eq!(s.step(11), Err(StepperError::MaxExceeded { max: 100.0 }));
        assert_eq!(s.normalize(44.0), Ok(40.0));
        assert_eq!(s.normalize(45.0), Ok(50.0));
        assert_eq!(s.normalize(-4.0), Ok(0.0));

        // 5 rounds to 10 at precision -1
        assert_eq!(
            Stepper::new(-1, 10, 5.0, 100.0, 0.0).unwrap_err(),
            StepperError::StepOverflow
        );
        // 105 rounds to 110
        assert_eq!(
            Stepper::new(-1, 10, 10.0, 105.0, 0.0).unwrap_err(),
            StepperError::MaxOverflow
        );
    }

    #[test]
    fn test_count_and_step() {
        let s = Stepper::new(2, 10, 0.1, 3.01, 2.31).unwrap();
        assert_eq!(s.count(), &BigInt::from(8));
        assert_eq!(s.count64(), (8, Exactness::Exact));
        assert!(s.is_bounded());
        assert_eq!(s.prec(), 2);
        assert_eq!(s.base(), 10);
        assert_eq!(s.step_value(), 0.1);

        let expected = [2.31, 2.41, 2.51, 2.61, 2.71, 2.81, 2.91, 3.01];
        for (i, want) in expected.iter().enumerate() {
            assert_eq!(s.step(i as i64), Ok(*want), "index {}", i);
        }

        assert_eq!(s.step(8), Err(StepperError::MaxExceeded { max: 3.01 }));
        assert_eq!(s.step(-1), Err(StepperError::MinExceeded { min: 2.31 }));
        assert_eq!(s.step(i64::MAX), Err(StepperError::MaxExceeded { max: 3.01 }));
    }

    #[test]
    fn test_single_point_range() {
        let s = Stepper::new(2, 10, 0.1, 2.31, 2.31).unwrap();
        assert_eq!(s.count64(), (1, Exactness::Exact));
        assert_eq!(s.step(0), Ok(2.31));
        assert_eq!(s.step(1), Err(StepperError::MaxExceeded { max: 2.31 }));
    }

    #[test]
    fn test_open_grid() {
        let s = Stepper::new(2, 8, 0.125, INF, -INF).unwrap();
        assert!(!s.is_bounded());
        assert!(s.count().is_zero());

        let expected = [
            -0.625, -0.5, -0.375, -0.25, -0.125, 0.0, 0.125, 0.25, 0.375, 0.5, 0.625,
        ];
        for (i, want) in (-5i64..=5).zip(expected.iter()) {
            assert_eq!(s.step(i), Ok(*want), "index {}", i);
        }
        assert_eq!(s.step(i64::MIN), Ok(i64::MIN as f64 * 0.125));
    }

    #[test]
    fn test_open_above() {
        let s = Stepper::new(2, 8, 0.125, INF, -5.0).unwrap();
        assert_eq!(s.step(0), Ok(-5.0));
        assert_eq!(s.step(5), Ok(-4.375));
        assert_eq!(s.step(-1), Err(StepperError::MinExceeded { min: -5.0 }));

        assert_eq!(s.normalize(-4.3), Ok(-4.25));
        assert_eq!(s.normalize(INF), Ok(INF));
        assert_eq!(s.normalize(-INF), Err(StepperError::MinExceeded { min: -5.0 }));
        assert_eq!(s.normalize(-6.0), Err(StepperError::MinExceeded { min: -5.0 }));
    }

    #[test]
    fn test_open_below() {
        let s = Stepper::new(2, 8, 0.125, -5.0, -INF).unwrap();
        assert_eq!(s.step(0), Ok(-5.0));
        assert_eq!(s.step(-1), Ok(-5.125));
        assert_eq!(s.step(1), Err(StepperError::MaxExceeded { max: -5.0 }));

        assert_eq!(s.normalize(-INF), Ok(-INF));
        assert_eq!(s.normalize(INF), Err(StepperError::MaxExceeded { max: -5.0 }));
        assert_eq!(s.normalize(-5.2), Ok(-5.25));
    }

    #[test]
    fn test_normalize() {
        let s = Stepper::new(2, 10, 0.25, -5.00, -7.00).unwrap();
        assert_eq!(s.count64(), (9, Exactness::Exact));

        assert_eq!(s.normalize(0.50), Err(StepperError::MaxExceeded { max: -5.0 }));
        assert_eq!(s.normalize(-7.75), Err(StepperError::MinExceeded { min: -7.0 }));
        assert_eq!(s.normalize(-6.376), Ok(-6.5));
        // 2.5 steps above min: the tie goes away from the anchor
        assert_eq!(s.normalize(-6.375), Ok(-6.25));
        assert_eq!(s.normalize(-6.374), Ok(-6.25));
        assert_eq!(s.normalize(-5.0), Ok(-5.0));
        assert_eq!(s.normalize(-4.9), Ok(-5.0));

        assert!(s.normalize(f64::NAN).unwrap().is_nan());
        assert_eq!(s.normalize(INF), Err(StepperError::MaxExceeded { max: -5.0 }));
        assert_eq!(s.normalize(-INF), Err(StepperError::MinExceeded { min: -7.0 }));
    }

    #[test]
    fn test_normalize_open_grid() {
        let s = Stepper::new(1, 10, 0.5, INF, -INF).unwrap();
        assert_eq!(s.normalize(1.26), Ok(1.5));
        assert_eq!(s.normalize(-1.25), Ok(-1.5));
        assert_eq!(s.normalize(-1.24), Ok(-1.0));
        assert_eq!(s.normalize(INF), Ok(INF));
        assert_eq!(s.normalize(-INF), Ok(-INF));
        // Doubles this large are integers, so they sit on the grid
        assert_eq!(s.normalize(1e300), Ok(1e300));
    }

    #[test]
    fn test_config_round_trip() {
        let s = Stepper::new(2, 10, 0.1, 3.01, 2.31).unwrap();
        let config = s.config();
        assert_eq!(config.step, 0.1);
        assert_eq!(config.max, 3.01);
        assert_eq!(config.min, 2.31);
        assert_eq!(config.build().unwrap().count(), s.count());
    }

    #[test]
    fn test_shared_across_threads() {
        let s = Arc::new(Stepper::new(2, 10, 0.25, -5.00, -7.00).unwrap());
        std::thread::scope(|scope| {
            for _ in 0..4 {
                let s = Arc::clone(&s);
                scope.spawn(move || {
                    for i in 0..9 {
                        let value = s.step(i).unwrap();
                        assert_eq!(s.normalize(value), Ok(value));
                    }
                });
            }
        });
    }

    proptest! {
        #[test]
        fn prop_step_then_normalize_is_identity(lo in -10_000i64..10_000, n in 0i64..500, i in 0i64..500) {
            let min = lo as f64 / 100.0;
            let max = (lo + n * 5) as f64 / 100.0;
            let s = Stepper::new(2, 10, 0.05, max, min).unwrap();
            prop_assert_eq!(s.count64(), (n + 1, Exactness::Exact));

            let index = i % (n + 1);
            let value = s.step(index).unwrap();
            prop_assert_eq!(s.normalize(value), Ok(value));
        }

        #[test]
        fn prop_normalize_lands_within_half_step(x in -20.0f64..20.0) {
            let s = Stepper::new(3, 10, 0.125, 20.0, -20.0).unwrap();
            let snapped = s.normalize(x).unwrap();
            let distance = (rational_from_f64(snapped).unwrap() - rational_from_f64(x).unwrap()).abs();
            prop_assert!(distance <= BigRational::new(BigInt::one(), BigInt::from(16)));
        }
    }
}
