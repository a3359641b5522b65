//! Degree/radian conversion for any float type.

use num_traits::{Float, FloatConst};

/// Convert degrees to radians: `deg * π / 180`.
pub fn degrees_to_radians<F: Float + FloatConst>(degrees: F) -> F {
    degrees * F::PI() / half_turn::<F>()
}

/// Convert radians to degrees: `rad * 180 / π`.
pub fn radians_to_degrees<F: Float + FloatConst>(radians: F) -> F {
    radians * (half_turn::<F>() / F::PI())
}

fn half_turn<F: Float>() -> F {
    // 180 is exactly representable in every IEEE float type.
    F::from(180.0).unwrap_or_else(F::nan)
}
