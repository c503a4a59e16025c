//! Scalar primitives for the crosswalk transforms.
//!
//! - `hinge(t, k) = max(0, t - k)`, the truncated-linear spline basis
//! - `clip(v, [lo, hi]) = min(max(v, lo), hi)`
//!
//! Both are written with `f64::max` / `f64::min` so that the evaluation order
//! is exactly the documented formula.

use crate::domain::ClipRange;

/// Truncated-linear basis `(t - k)+`.
pub fn hinge(t: f64, knot: f64) -> f64 {
    0.0_f64.max(t - knot)
}

/// Clamp `v` into `range`.
///
/// Not `f64::clamp`: that panics when `lo > hi`, while this simply lets `hi`
/// win, which is what the formula prescribes.
pub fn clip(v: f64, range: ClipRange) -> f64 {
    v.max(range.lo).min(range.hi)
}
