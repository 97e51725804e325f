// ============================================================================
// Basic Usage Example
// ============================================================================

use stepgrid::numeric::Number;
use stepgrid::prelude::*;

fn main() {
    #[cfg(feature = "logging")]
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    println!("=== Stepgrid Example ===\n");

    // Fixed-precision numbers round half away from zero after every write
    println!("Decimal numbers at precision 1:");
    for i in 0..5 {
        let mut n = Number::decimal(1);
        n.set_f64(0.33 * i as f64);
        println!("  0.33 * {} -> {}", i, n);
    }

    // Bounded decimal grid
    println!("\n=== Bounded Grid ===");
    let stepper = match StepperConfig::decimal(2, 0.1).with_range(2.31, 3.01).build() {
        Ok(stepper) => stepper,
        Err(err) => {
            eprintln!("invalid grid: {}", err);
            return;
        },
    };
    println!("Points: {}", stepper.count());
    for i in -1..=8 {
        match stepper.step(i) {
            Ok(value) => println!("  step({}) = {}", i, value),
            Err(err) => println!("  step({}) -> {} (clamp to {:?})", i, err, err.clamped()),
        }
    }

    // Snapping readings onto the grid
    println!("\n=== Normalize ===");
    let stepper = match Stepper::new(2, 10, 0.25, -5.0, -7.0) {
        Ok(stepper) => stepper,
        Err(err) => {
            eprintln!("invalid grid: {}", err);
            return;
        },
    };
    for x in [0.5, -6.376, -6.375, -6.374, -7.75, f64::NAN] {
        match stepper.normalize(x) {
            Ok(value) => println!("  normalize({}) = {}", x, value),
            Err(err) => println!("  normalize({}) -> {}", x, err),
        }
    }

    // Rejected configurations
    println!("\n=== Validation ===");
    let candidates = [
        (0.105, 3.01, 2.31),
        (0.1, 3.015, 2.31),
        (0.1, 3.01, 2.315),
        (0.15, 3.01, 2.31),
        (0.1, 2.31, 3.01),
        (0.1, f64::INFINITY, f64::NEG_INFINITY),
    ];
    for (step, max, min) in candidates {
        match Stepper::new(2, 10, step, max, min) {
            Ok(_) => println!("  step={} max={} min={}: ok", step, max, min),
            Err(err) => println!("  step={} max={} min={}: {}", step, max, min, err),
        }
    }

    // Open octal grid
    println!("\n=== Open Grid ===");
    if let Ok(stepper) = StepperConfig::octal(2, 0.125).build() {
        let values: Vec<f64> = (-5..=5).filter_map(|i| stepper.step(i).ok()).collect();
        println!("  {:?}", values);
    }
}
