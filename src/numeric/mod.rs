// ============================================================================
// Numeric Module
// Exact rounding and fixed-precision arithmetic over arbitrary-precision rationals
// ============================================================================
//
// This module provides:
// - Exact floor/ceil/round/trunc over BigRational with exactness tags
// - A lossless bridge between f64 and BigRational
// - Number: rational-backed value renormalized to base^-precision
// - Positional text in bases 2..=36
// - NumericError: Error types for numeric operations
//
// Design principles:
// - No floating-point intermediates: doubles are lifted exactly first
// - Ties always round half away from zero
// - Every lossy conversion reports its direction through Exactness

mod errors;
mod exactness;
pub mod float;
mod number;
pub mod rounding;
pub mod text;

pub use errors::{check_base, NumericError, NumericResult, MAX_BASE, MIN_BASE};
pub use exactness::Exactness;
pub use number::{Number, Real};
