//! Scalar conversion functions backing the graph's unary ops.
//!
//! All functions are allocation-free and suitable for `no_std`; transcendental
//! math comes from `libm`. The evaluator calls these per sample, and tests use
//! them to compute expected values with identical floating-point behavior.

use libm::{expf, logf};

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use grafo_core::math::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// The argument is floored at `1e-10` so silence maps to a large negative
/// decibel value (−200 dB) instead of −∞.
///
/// # Example
/// ```rust
/// use grafo_core::math::linear_to_db;
///
/// assert!((linear_to_db(1.0) - 0.0).abs() < 0.001);
/// assert!((linear_to_db(0.5) - (-6.02)).abs() < 0.01);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    // 20 * log10(linear) = 20 * ln(linear) / ln(10)
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Convert a time constant in seconds to a one-pole filter coefficient.
///
/// `pole = exp(-1 / (tau * sample_rate))`. Longer time constants give
/// coefficients closer to 1 (slower smoothing); the result is in (0, 1)
/// for positive `tau`.
#[inline]
pub fn tau_to_pole(tau_seconds: f32, sample_rate: f32) -> f32 {
    expf(-1.0 / (tau_seconds * sample_rate))
}

/// Convert milliseconds to seconds.
#[inline]
pub fn ms_to_seconds(ms: f32) -> f32 {
    ms * 0.001
}
