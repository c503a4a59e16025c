//! Request operations: `score`, `batch`, and `route`.
//!
//! Every operation takes the loaded [`Model`] explicitly; nothing here reads
//! files or holds state between calls.

use serde::Serialize;
use serde_json::Value;

use crate::domain::Model;
use crate::error::ConfigError;

pub mod coerce;
pub mod route;
pub mod score;

pub use route::*;
pub use score::*;

/// Request-level failures. Each maps to one HTTP status and error body.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Invalid input")]
    InvalidInput,

    #[error("Invalid domain")]
    InvalidDomain,

    #[error("Unknown action")]
    UnknownAction,

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// The model directory could not be loaded.
    #[error(transparent)]
    Model(#[from] ConfigError),
}

/// The `action` field of a POST body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Score,
    Batch,
    Route,
}

impl Action {
    /// Read `action` from a body. Anything but the three known names (or a
    /// non-object body) is unknown.
    pub fn from_body(body: &Value) -> Option<Self> {
        match body.get("action").and_then(Value::as_str)? {
            "score" => Some(Action::Score),
            "batch" => Some(Action::Batch),
            "route" => Some(Action::Route),
            _ => None,
        }
    }
}

/// Body of a successful POST.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionResponse {
    Score(ScoreResponse),
    Batch(Vec<Value>),
    Route(RouteDecision),
}

/// Dispatch a POST body to its operation.
pub fn handle_action(model: &Model, body: &Value) -> Result<ActionResponse, RequestError> {
    let action = Action::from_body(body).ok_or(RequestError::UnknownAction)?;
    let out = match action {
        Action::Score => ActionResponse::Score(score_request(model, body)?),
        Action::Batch => ActionResponse::Batch(batch(model, body.get("items"))),
        Action::Route => ActionResponse::Route(route_request(model, body)?),
    };
    Ok(out)
}
