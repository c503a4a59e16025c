//! `score` and `batch` operations.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::{Domain, Model};
use crate::models::transform;
use crate::service::RequestError;
use crate::service::coerce;

/// Successful `score` result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResponse {
    pub domain: Domain,
    pub survey_t: f64,
    pub calibrated_t: f64,
}

/// Marker attached to batch items that could not be scored.
pub const INVALID_ITEM: &str = "invalid";

/// Calibrate one score. `None` when the domain is not configured or `survey_t`
/// is not finite.
pub fn calibrate(model: &Model, domain: Domain, survey_t: f64) -> Option<f64> {
    if !survey_t.is_finite() {
        return None;
    }
    let xwalk = model.xwalk(domain)?;
    Some(transform(xwalk, survey_t, model.config.clip))
}

/// `score` on typed input.
pub fn score(model: &Model, domain: Domain, survey_t: f64) -> Result<ScoreResponse, RequestError> {
    let calibrated_t = calibrate(model, domain, survey_t).ok_or(RequestError::InvalidInput)?;
    Ok(ScoreResponse {
        domain,
        survey_t,
        calibrated_t,
    })
}

/// `score` on a loosely typed request body.
pub fn score_request(model: &Model, body: &Value) -> Result<ScoreResponse, RequestError> {
    let domain = coerce::domain(body.get("domain")).ok_or(RequestError::InvalidInput)?;
    let survey_t = coerce::number(body.get("survey_t"));
    score(model, domain, survey_t)
}

/// Score one batch item, returning it with `calibrated_t` or `error` added.
///
/// Non-object items are treated as empty objects.
pub fn score_item(model: &Model, item: &Value) -> Value {
    let mut out = match item {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    let calibrated = coerce::domain(item.get("domain"))
        .and_then(|domain| calibrate(model, domain, coerce::number(item.get("survey_t"))));

    match calibrated {
        Some(y) => {
            out.insert("calibrated_t".to_string(), Value::from(y));
        }
        None => {
            out.insert("error".to_string(), Value::from(INVALID_ITEM));
        }
    }
    Value::Object(out)
}

/// `batch`: one output per input item, in order. A non-array `items` is an
/// empty batch.
pub fn batch(model: &Model, items: Option<&Value>) -> Vec<Value> {
    match items {
        Some(Value::Array(items)) => items.iter().map(|item| score_item(model, item)).collect(),
        _ => Vec::new(),
    }
}
