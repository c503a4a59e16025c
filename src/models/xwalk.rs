//! Crosswalk evaluation.
//!
//! Two primitive operations:
//! - `raw_value`: the unclipped linear / hinge-spline value at `t`
//! - `transform`: `raw_value` clamped to the effective clip range
//!
//! The effective range is the crosswalk's own `clip` when present, else the
//! model-wide default.

use crate::domain::{ClipRange, Xwalk};
use crate::math::{clip, hinge};

/// Unclipped crosswalk value at `t`.
pub fn raw_value(xwalk: &Xwalk, t: f64) -> f64 {
    match xwalk {
        Xwalk::Linear { slope, intercept, .. } => slope * t + intercept,
        Xwalk::Piecewise { a, b, c, d, knots, .. } => {
            let [k1, k2] = *knots;
            let h1 = hinge(t, k1);
            let h2 = hinge(t, k2);
            a + b * t + c * h1 + d * h2
        }
    }
}

/// Clip range actually applied to `xwalk`.
pub fn effective_clip(xwalk: &Xwalk, default_clip: ClipRange) -> ClipRange {
    xwalk.clip().unwrap_or(default_clip)
}

/// Map a survey T-score to a calibrated T-score.
pub fn transform(xwalk: &Xwalk, t: f64, default_clip: ClipRange) -> f64 {
    clip(raw_value(xwalk, t), effective_clip(xwalk, default_clip))
}
