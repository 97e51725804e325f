// ============================================================================
// Stepper Configuration
// Typed builder and presets for grid parameters
// ============================================================================

use super::errors::{StepperError, StepperResult};
use super::grid::Stepper;
use crate::numeric::check_base;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of a [`Stepper`], defaulting to an open range.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepperConfig {
    /// Fractional digits kept by the grid (may be negative)
    pub precision: i32,

    /// Radix of the grid, 2..=36
    pub base: u32,

    /// Distance between neighbouring grid points
    pub step: f64,

    /// Upper bound, `+inf` for none
    pub max: f64,

    /// Lower bound, `-inf` for none
    pub min: f64,
}

impl StepperConfig {
    /// Create an unbounded configuration
    pub fn new(precision: i32, base: u32, step: f64) -> Self {
        Self {
            precision,
            base,
            step,
            max: f64::INFINITY,
            min: f64::NEG_INFINITY,
        }
    }

    /// Builder method: Set upper bound
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = max;
        self
    }

    /// Builder method: Set lower bound
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = min;
        self
    }

    /// Builder method: Set both bounds
    pub fn with_range(self, min: f64, max: f64) -> Self {
        self.with_min(min).with_max(max)
    }

    /// Cheap checks that need no exact arithmetic.
    ///
    /// Passing does not guarantee [`build`](Self::build) succeeds: exact
    /// representability and range divisibility are only checked there.
    pub fn validate(&self) -> StepperResult<()> {
        check_base(self.base).map_err(|_| StepperError::InvalidBase(self.base))?;

        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(StepperError::StepOverflow);
        }
        if self.max.is_nan() {
            return Err(StepperError::MaxOverflow);
        }
        if self.min.is_nan() {
            return Err(StepperError::MinOverflow);
        }
        if self.max < self.min {
            return Err(StepperError::UnorderedMaxMin);
        }
        if self.max == self.min && self.max.is_infinite() {
            return Err(StepperError::RangeOverflow);
        }

        Ok(())
    }

    /// Build the stepper described by this configuration
    pub fn build(&self) -> StepperResult<Stepper> {
        Stepper::new(self.precision, self.base, self.step, self.max, self.min)
    }
}

// ============================================================================
// Preset Configurations (Factory Methods)
// ============================================================================

impl StepperConfig {
    /// Decimal grid, e.g. prices with `precision` cents-style digits
    pub fn decimal(precision: i32, step: f64) -> Self {
        Self::new(precision, 10, step)
    }

    /// Binary grid; every point is a dyadic rational
    pub fn binary(precision: i32, step: f64) -> Self {
        Self::new(precision, 2, step)
    }

    pub fn octal(precision: i32, step: f64) -> Self {
        Self::new(precision, 8, step)
    }

    pub fn hexadecimal(precision: i32, step: f64) -> Self {
        Self::new(precision, 16, step)
    }
}
