// ============================================================================
// Stepgrid Library
// Exact fixed-precision arithmetic and lossless step grids over IEEE-754 doubles
// ============================================================================

//! # Stepgrid
//!
//! Exact numeric building blocks for values that live on a discrete grid
//! (price ticks, lot sizes, quantized sensor readings) but travel as `f64`.
//!
//! ## Features
//!
//! - **Exact rounding** of arbitrary-precision rationals (floor, ceil, round
//!   half away from zero, truncation) with explicit exactness reporting
//! - **Fixed-precision numbers** in any base 2..=36, renormalized after every
//!   operation
//! - **Steppers** that validate a (step, max, min) triple once and then map
//!   indices to doubles and doubles to grid points without drift
//!
//! ## Example
//!
//! ```rust
//! use stepgrid::prelude::*;
//!
//! // Decimal grid from 2.31 to 3.01 in steps of 0.1
//! let stepper = StepperConfig::decimal(2, 0.1)
//!     .with_range(2.31, 3.01)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(stepper.count64(), (8, Exactness::Exact));
//! assert_eq!(stepper.step(3), Ok(2.61));
//! assert_eq!(stepper.normalize(2.67), Ok(2.71));
//!
//! // Queries past a bound report the bound to clamp to
//! let err = stepper.normalize(9.0).unwrap_err();
//! assert_eq!(err.clamped(), Some(3.01));
//!
//! // The same rounding is available on single numbers
//! let mut n = Number::decimal(1);
//! n.set_f64(1.26);
//! assert_eq!(n.to_string(), "1.3");
//! ```

pub mod numeric;
pub mod stepper;

// Re-exports for convenience
pub mod prelude {
    pub use crate::numeric::{Exactness, Number, NumericError, NumericResult, Real};
    pub use crate::stepper::{Stepper, StepperConfig, StepperError, StepperResult};
}
