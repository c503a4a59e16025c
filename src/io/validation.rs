//! Semantic checks on a parsed model.
//!
//! Collects *all* violations before returning so a broken model directory can
//! be fixed in one pass. Each message names the offending field and value.

use crate::domain::{ClipRange, Model, Xwalk};

/// Validate clip ranges, knot order, coefficient finiteness, and that each
/// crosswalk file matches the method declared for its domain.
pub fn validate(model: &Model) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let config = &model.config;

    check_clip("clip", config.clip, &mut errors);

    for domain in &config.domains {
        let Some(xwalk) = model.xwalks.get(domain) else {
            errors.push(format!("calibration.{domain}: crosswalk not loaded"));
            continue;
        };

        if let Some(entry) = config.calibration.get(domain) {
            if entry.method != xwalk.method() {
                errors.push(format!(
                    "calibration.{domain}.method is '{}' but {} has type '{}'",
                    entry.method,
                    entry.file,
                    xwalk.method()
                ));
            }
        }

        match xwalk {
            Xwalk::Linear { slope, intercept, clip } => {
                check_finite(*domain, "slope", *slope, &mut errors);
                check_finite(*domain, "intercept", *intercept, &mut errors);
                if let Some(clip) = clip {
                    check_clip(&format!("xwalk.{domain}.clip"), *clip, &mut errors);
                }
            }
            Xwalk::Piecewise { a, b, c, d, knots, clip } => {
                for (name, v) in [("a", a), ("b", b), ("c", c), ("d", d)] {
                    check_finite(*domain, name, *v, &mut errors);
                }
                let [k1, k2] = *knots;
                if !(k1.is_finite() && k2.is_finite() && k1 < k2) {
                    errors.push(format!("xwalk.{domain}.knots [{k1}, {k2}]: require k1 < k2"));
                }
                if let Some(clip) = clip {
                    check_clip(&format!("xwalk.{domain}.clip"), *clip, &mut errors);
                }
            }
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn check_clip(field: &str, clip: ClipRange, errors: &mut Vec<String>) {
    if !clip.is_well_formed() {
        errors.push(format!("{field} [{}, {}]: require finite lo <= hi", clip.lo, clip.hi));
    }
}

fn check_finite(domain: crate::domain::Domain, name: &str, v: f64, errors: &mut Vec<String>) {
    if !v.is_finite() {
        errors.push(format!("xwalk.{domain}.{name} = {v}: must be finite"));
    }
}
