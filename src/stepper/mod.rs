// ============================================================================
// Stepper Module
// Exact index <-> double mapping over evenly spaced grids
// ============================================================================
//
// This module provides:
// - Stepper: validated grid of step-spaced points between min and max
// - StepperConfig: Builder and presets for grid parameters
// - StepperError: Construction failures and boundary outcomes
//
// Design principles:
// - Validate once at construction; queries never mutate
// - Every point of a bounded grid survives the trip through f64
// - Boundary outcomes carry the bound so callers can clamp

mod config;
mod errors;
mod grid;

pub use config::StepperConfig;
pub use errors::{StepperError, StepperResult};
pub use grid::Stepper;
