// ============================================================================
// Stepper Errors
// Construction failures and boundary outcomes of grid queries
// ============================================================================

use std::fmt;

/// Errors returned by [`Stepper`](super::Stepper) construction and queries.
///
/// The `*Exceeded` variants are not fatal: they carry the bound the query was
/// clamped to, so callers may clamp and continue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepperError {
    /// Base outside 2..=36
    InvalidBase(u32),
    /// Step is non-positive, non-finite or not a grid value
    StepOverflow,
    /// Max is not a grid value or sits too far from its neighbouring double
    MaxOverflow,
    /// Min is not a grid value or sits too far from its neighbouring double
    MinOverflow,
    /// Range is not a whole number of steps, or both bounds are the same infinity
    RangeOverflow,
    /// Max lies below min
    UnorderedMaxMin,
    /// Query fell above a finite max
    MaxExceeded { max: f64 },
    /// Query fell below a finite min
    MinExceeded { min: f64 },
}

impl StepperError {
    /// The bound a query was clamped to, for the `*Exceeded` variants.
    #[inline]
    pub fn clamped(&self) -> Option<f64> {
        match self {
            StepperError::MaxExceeded { max } => Some(*max),
            StepperError::MinExceeded { min } => Some(*min),
            _ => None,
        }
    }

    /// True for the query outcomes that leave the stepper usable.
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.clamped().is_some()
    }
}

impl fmt::Display for StepperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepperError::InvalidBase(base) => write!(f, "invalid base: {}", base),
            StepperError::StepOverflow => write!(f, "step overflow"),
            StepperError::MaxOverflow => write!(f, "max overflow"),
            StepperError::MinOverflow => write!(f, "min overflow"),
            StepperError::RangeOverflow => write!(f, "range overflow"),
            StepperError::UnorderedMaxMin => write!(f, "unordered max min"),
            StepperError::MaxExceeded { .. } => write!(f, "max exceeded"),
            StepperError::MinExceeded { .. } => write!(f, "min exceeded"),
        }
    }
}

impl std::error::Error for StepperError {}

/// Result type alias for stepper construction and queries
pub type StepperResult<T> = Result<T, StepperError>;
