//! Formatted terminal output for `tcal check`.
//!
//! Formatting lives here so the loader and scoring code stay free of
//! presentation concerns.

use crate::domain::{Model, Xwalk};
use crate::models::effective_clip;

/// Human-readable summary of a loaded model: version, routing parameters, and
/// one line per domain with its crosswalk, clip range, MCID, and item bounds.
pub fn format_model_summary(model: &Model) -> String {
    let config = &model.config;
    let routing = &config.routing;
    let rule = &routing.a_d_second_pass;
    let mut out = String::new();

    out.push_str("=== tcal - model check ===\n");
    out.push_str(&format!("Version: {}\n", config.version));
    out.push_str(&format!("Default clip: [{}, {}]\n", config.clip.lo, config.clip.hi));
    out.push_str(&format!("Gate items per domain: {}\n", routing.gate_items_per_domain));
    out.push_str(&format!(
        "A/D second pass: {} (se > {}, theta_t > {}, discordance {}, +{} items)\n",
        if rule.enabled { "enabled" } else { "disabled" },
        rule.se_threshold,
        rule.theta_hi_t,
        if rule.discordance_trigger { "on" } else { "off" },
        rule.extra_items,
    ));
    out.push('\n');
    out.push_str(&format!(
        "{:<4} {:<10} {:<26} {:<14} {:>6} {:>7} {:>9}\n",
        "Dom", "Method", "Coefficients", "Clip", "MCID", "Items", "Stop SE"
    ));

    for domain in &config.domains {
        let Some(xwalk) = model.xwalks.get(domain) else {
            continue;
        };
        let clip = effective_clip(xwalk, config.clip);
        let coefficients = match xwalk {
            Xwalk::Linear { slope, intercept, .. } => format!("{slope:+.3}t {intercept:+.3}"),
            Xwalk::Piecewise { a, b, c, d, knots, .. } => {
                format!("{a:.2},{b:.2},{c:.2},{d:.2} @{}/{}", knots[0], knots[1])
            }
        };
        let items = match (routing.min_items.get(domain), routing.max_items.get(domain)) {
            (Some(lo), Some(hi)) => format!("{lo}-{hi}"),
            _ => "-".to_string(),
        };
        let opt = |v: Option<&f64>| v.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string());

        out.push_str(&format!(
            "{:<4} {:<10} {:<26} {:<14} {:>6} {:>7} {:>9}\n",
            domain.code(),
            xwalk.method().to_string(),
            coefficients,
            format!("[{}, {}]", clip.lo, clip.hi),
            opt(config.mcid.get(domain)),
            items,
            opt(routing.stop_se_t.get(domain)),
        ));
    }

    out
}
