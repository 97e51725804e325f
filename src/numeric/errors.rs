// ============================================================================
// Numeric Errors
// Error types for fixed-precision arithmetic operations
// ============================================================================

use std::fmt;

/// Errors that can occur while building or combining fixed-precision numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericError {
    /// Base outside 2..=36
    InvalidBase(u32),
    /// Conversion would lose significant digits
    PrecisionLoss,
    /// Input string or value is invalid
    InvalidInput,
    /// Precision or base mismatch between operands
    ScaleMismatch,
    /// Result does not fit the target type
    Overflow,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::InvalidBase(base) => {
                write!(f, "invalid base: {} is outside 2..=36", base)
            },
            NumericError::PrecisionLoss => write!(
                f,
                "precision loss: conversion would lose significant digits"
            ),
            NumericError::InvalidInput => write!(f, "invalid input: could not parse value"),
            NumericError::ScaleMismatch => {
                write!(f, "scale mismatch: operands differ in precision or base")
            },
            NumericError::Overflow => {
                write!(f, "overflow: value does not fit the target type")
            },
        }
    }
}

impl std::error::Error for NumericError {}

/// Result type alias for numeric operations
pub type NumericResult<T> = Result<T, NumericError>;

/// Smallest accepted base.
pub const MIN_BASE: u32 = 2;

/// Largest accepted base.
pub const MAX_BASE: u32 = 36;

/// Checks that `base` lies in `MIN_BASE..=MAX_BASE`.
#[inline]
pub fn check_base(base: u32) -> NumericResult<()> {
    if (MIN_BASE..=MAX_BASE).contains(&base) {
        Ok(())
    } else {
        Err(NumericError::InvalidBase(base))
    }
}
