//! `route`: should the adaptive test administer extra items?
//!
//! Two-tier decision table, no state:
//! - A/D with the second-pass rule enabled: SE, high theta, or discordance
//!   triggers `rule.extra_items`
//! - everything else: one extra item while SE is above the domain's stop-SE

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Domain, Model};
use crate::service::RequestError;
use crate::service::coerce;

/// Default `theta_t` when the caller has no estimate yet (T-scale mean).
pub const DEFAULT_THETA_T: f64 = 50.0;

/// Routing input after coercion and defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteInput {
    pub domain: Domain,
    pub interim_se: f64,
    pub theta_t: f64,
    pub discordant: bool,
}

impl RouteInput {
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            interim_se: 0.0,
            theta_t: DEFAULT_THETA_T,
            discordant: false,
        }
    }
}

/// Why a recommendation was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteReason {
    SecondPass,
    HighSe,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDecision {
    pub domain: Domain,
    pub extra_items: u32,
    pub reason: RouteReason,
}

/// Decide on typed input.
pub fn route(model: &Model, input: RouteInput) -> Result<RouteDecision, RequestError> {
    let config = &model.config;
    if !config.has_domain(input.domain) {
        return Err(RequestError::InvalidDomain);
    }

    let rule = &config.routing.a_d_second_pass;
    let (extra_items, reason) = if input.domain.second_pass_eligible() && rule.enabled {
        let triggered = input.interim_se > rule.se_threshold
            || input.theta_t > rule.theta_hi_t
            || (input.discordant && rule.discordance_trigger);
        if triggered {
            (rule.extra_items, RouteReason::SecondPass)
        } else {
            (0, RouteReason::Stable)
        }
    } else {
        let high_se = config
            .routing
            .stop_se_t
            .get(&input.domain)
            .is_some_and(|stop_se| input.interim_se > *stop_se);
        if high_se { (1, RouteReason::HighSe) } else { (0, RouteReason::Stable) }
    };

    Ok(RouteDecision {
        domain: input.domain,
        extra_items,
        reason,
    })
}

/// Decide on a loosely typed request body.
pub fn route_request(model: &Model, body: &Value) -> Result<RouteDecision, RequestError> {
    let domain = coerce::domain(body.get("domain")).ok_or(RequestError::InvalidDomain)?;
    let input = RouteInput {
        domain,
        interim_se: coerce::number_or(body.get("interim_se"), 0.0),
        theta_t: coerce::number_or(body.get("theta_t"), DEFAULT_THETA_T),
        discordant: coerce::truthy(body.get("discordant")),
    };
    route(model, input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::model_dir::fixtures;
    use serde_json::json;

    fn input(domain: Domain, interim_se: f64) -> RouteInput {
        RouteInput {
            interim_se,
            ..RouteInput::new(domain)
        }
    }

    #[test]
    fn second_pass_on_high_se() {
        let model = fixtures::model();
        let d = route(&model, input(Domain::A, 6.0)).unwrap();
        assert_eq!(d.extra_items, 4);
        assert_eq!(d.reason, RouteReason::SecondPass);
    }

    #[test]
    fn second_pass_on_high_theta_or_discordance() {
        let model = fixtures::model();
        let high_theta = RouteInput {
            theta_t: 71.0,
            ..RouteInput::new(Domain::D)
        };
        assert_eq!(route(&model, high_theta).unwrap().reason, RouteReason::SecondPass);

        let discordant = RouteInput {
            discordant: true,
            ..RouteInput::new(Domain::D)
        };
        assert_eq!(route(&model, discordant).unwrap().reason, RouteReason::SecondPass);
    }

    #[test]
    fn discordance_ignored_when_trigger_disabled() {
        let mut model = fixtures::model();
        model.config.routing.a_d_second_pass.discordance_trigger = false;
        let discordant = RouteInput {
            discordant: true,
            ..RouteInput::new(Domain::A)
        };
        let d = route(&model, discordant).unwrap();
        assert_eq!((d.extra_items, d.reason), (0, RouteReason::Stable));
    }

    #[test]
    fn thresholds_are_strict() {
        let model = fixtures::model();
        let at_se = route(&model, input(Domain::A, 5.0)).unwrap();
        assert_eq!(at_se.reason, RouteReason::Stable);
        let at_theta = RouteInput {
            theta_t: 70.0,
            ..RouteInput::new(Domain::A)
        };
        assert_eq!(route(&model, at_theta).unwrap().reason, RouteReason::Stable);
        let at_stop = route(&model, input(Domain::Pf, 4.0)).unwrap();
        assert_eq!(at_stop.reason, RouteReason::Stable);
    }

    #[test]
    fn other_domains_use_stop_se() {
        let model = fixtures::model();
        let stable = route(&model, input(Domain::Pi, 3.0)).unwrap();
        assert_eq!((stable.extra_items, stable.reason), (0, RouteReason::Stable));
        let high = route(&model, input(Domain::Pi, 5.0)).unwrap();
        assert_eq!((high.extra_items, high.reason), (1, RouteReason::HighSe));
    }

    #[test]
    fn a_and_d_fall_back_to_stop_se_when_rule_disabled() {
        let mut model = fixtures::model();
        model.config.routing.a_d_second_pass.enabled = false;
        // stop_se_t for A is 3.5 in the fixture.
        let d = route(&model, input(Domain::A, 3.6)).unwrap();
        assert_eq!((d.extra_items, d.reason), (1, RouteReason::HighSe));
        let high_theta = RouteInput {
            theta_t: 90.0,
            ..RouteInput::new(Domain::A)
        };
        assert_eq!(route(&model, high_theta).unwrap().reason, RouteReason::Stable);
    }

    #[test]
    fn missing_stop_se_is_stable() {
        let mut model = fixtures::model();
        model.config.routing.stop_se_t.remove(&Domain::F);
        let d = route(&model, input(Domain::F, 99.0)).unwrap();
        assert_eq!(d.reason, RouteReason::Stable);
    }

    #[test]
    fn unlisted_domain_is_rejected() {
        let mut model = fixtures::model();
        model.config.domains.retain(|d| *d != Domain::Sr);
        assert!(matches!(
            route(&model, RouteInput::new(Domain::Sr)),
            Err(RequestError::InvalidDomain)
        ));
    }

    #[test]
    fn request_defaults_and_coercion() {
        let model = fixtures::model();
        let d = route_request(&model, &json!({"domain": "A"})).unwrap();
        assert_eq!(d.reason, RouteReason::Stable);

        let d = route_request(&model, &json!({"domain": "PF", "interim_se": "4.5"})).unwrap();
        assert_eq!(d.reason, RouteReason::HighSe);

        // Unparseable numbers never exceed a threshold.
        let d = route_request(&model, &json!({"domain": "A", "interim_se": "n/a", "theta_t": "?"})).unwrap();
        assert_eq!(d.reason, RouteReason::Stable);

        let d = route_request(&model, &json!({"domain": "D", "discordant": 1})).unwrap();
        assert_eq!(d.reason, RouteReason::SecondPass);

        assert!(matches!(
            route_request(&model, &json!({"domain": "XX"})),
            Err(RequestError::InvalidDomain)
        ));
    }

    #[test]
    fn interim_se_follows_numeric_string_rules() {
        let model = fixtures::model();
        let reason = |se: Value| route_request(&model, &json!({"domain": "PF", "interim_se": se})).unwrap().reason;

        assert_eq!(reason(json!("inf")), RouteReason::Stable);
        assert_eq!(reason(json!("nan")), RouteReason::Stable);
        assert_eq!(reason(json!("Infinity")), RouteReason::HighSe);
        assert_eq!(reason(json!([5])), RouteReason::HighSe);
        assert_eq!(reason(json!("0x10")), RouteReason::HighSe);
        assert_eq!(reason(json!([])), RouteReason::Stable);
    }

    #[test]
    fn decision_serializes_with_wire_names() {
        let model = fixtures::model();
        let d = route(&model, input(Domain::Pf, 5.0)).unwrap();
        assert_eq!(
            serde_json::to_value(d).unwrap(),
            json!({"domain": "PF", "extra_items": 1, "reason": "high_se"})
        );
    }
}
