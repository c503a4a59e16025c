//! HTTP endpoint.
//!
//! One path (default `/api/model`) answers every method:
//! - `GET`  — `{ok, version, domains}`
//! - `POST` — `{action: "score" | "batch" | "route", ...}`
//! - other methods — `405`
//!
//! The model is resolved before method dispatch, so with the per-request
//! policy a broken model directory turns every call into a `500`.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::domain::Domain;
use crate::error::AppError;
use crate::service::{RequestError, handle_action};

pub mod source;

pub use source::{ModelSource, ReloadPolicy};

/// Error code reported for configuration failures, kept stable for clients.
pub const INVOCATION_FAILED: &str = "FUNCTION_INVOCATION_FAILED";

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path the endpoint is mounted on.
    pub route_path: String,
    /// Directory holding `model_config.json` and the crosswalk files.
    pub model_dir: PathBuf,
    pub reload: ReloadPolicy,
    /// Maximum accepted request body, in bytes.
    pub max_request_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            route_path: "/api/model".to_string(),
            model_dir: PathBuf::from("model"),
            reload: ReloadPolicy::PerRequest,
            max_request_size: 1024 * 1024,
        }
    }
}

struct AppState {
    source: ModelSource,
}

/// `GET` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Introspection {
    pub ok: bool,
    pub version: String,
    pub domains: Vec<Domain>,
}

/// Build the router for `source`, mounted at `route_path`.
pub fn build_router(source: ModelSource, route_path: &str, max_request_size: usize) -> Router {
    let state = Arc::new(AppState { source });
    Router::new()
        .route(route_path, any(model_endpoint))
        .layer(RequestBodyLimitLayer::new(max_request_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn start_server(config: ServerConfig) -> Result<(), AppError> {
    if !config.route_path.starts_with('/') {
        return Err(AppError::new(3, format!("Route path must start with '/': {}", config.route_path)));
    }
    let source = ModelSource::open(&config.model_dir, config.reload)?;
    let app = build_router(source, &config.route_path, config.max_request_size);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::new(4, format!("Failed to bind {addr}: {e}")))?;

    info!("Serving {} on http://{}", config.route_path, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::new(4, format!("Server error: {e}")))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed.
        std::future::pending::<()>().await;
    }
}

async fn model_endpoint(State(state): State<Arc<AppState>>, method: Method, body: Bytes) -> Result<Response, RequestError> {
    let model = state.source.current().await?;

    match method {
        Method::GET => Ok(Json(Introspection {
            ok: true,
            version: model.config.version.clone(),
            domains: model.config.domains.clone(),
        })
        .into_response()),
        Method::POST => {
            // An unreadable body has no action, which is reported as such.
            let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            let out = handle_action(&model, &body)?;
            Ok(Json(out).into_response())
        }
        _ => Err(RequestError::MethodNotAllowed),
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            RequestError::InvalidInput | RequestError::InvalidDomain | RequestError::UnknownAction => {
                debug!(error = %self, "rejected request");
                (StatusCode::BAD_REQUEST, json!({"error": self.to_string()}))
            }
            RequestError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, json!({"error": self.to_string()})),
            RequestError::Model(err) => {
                error!(error = %err, "model load failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": INVOCATION_FAILED, "message": err.to_string()}),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::model_dir::fixtures;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    const PATH: &str = "/api/model";

    fn app_for(dir: &std::path::Path, policy: ReloadPolicy) -> Router {
        let source = ModelSource::open(dir, policy).unwrap();
        build_router(source, PATH, 64 * 1024)
    }

    fn fixture_app() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        fixtures::write_model(dir.path());
        let app = app_for(dir.path(), ReloadPolicy::PerRequest);
        (dir, app)
    }

    fn post(body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(PATH)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1_000_000).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn get_reports_version_and_domains() {
        let (_dir, app) = fixture_app();
        let req = Request::builder().uri(PATH).body(Body::empty()).unwrap();
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"ok": true, "version": "test-1.2.0", "domains": ["PF", "PI", "F", "SR", "A", "D"]})
        );
    }

    #[tokio::test]
    async fn post_score_returns_calibrated_value() {
        let (_dir, app) = fixture_app();
        let (status, body) = send(app, post(json!({"action": "score", "domain": "PF", "survey_t": 55}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["domain"], "PF");
        assert_eq!(body["survey_t"], json!(55.0));
        assert_eq!(body["calibrated_t"], json!(1.05 * 55.0 + -2.0));
    }

    #[tokio::test]
    async fn post_score_rejects_unknown_domain() {
        let (_dir, app) = fixture_app();
        let (status, body) = send(app, post(json!({"action": "score", "domain": "ZZ", "survey_t": 55}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid input"}));
    }

    #[tokio::test]
    async fn post_batch_isolates_items() {
        let (_dir, app) = fixture_app();
        let req = post(json!({
            "action": "batch",
            "items": [{"domain": "PF", "survey_t": 55}, {"domain": "ZZ", "survey_t": 10}]
        }));
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["calibrated_t"], json!(1.05 * 55.0 + -2.0));
        assert_eq!(items[1], json!({"domain": "ZZ", "survey_t": 10, "error": "invalid"}));
    }

    #[tokio::test]
    async fn post_batch_marks_out_of_range_number_invalid() {
        let (_dir, app) = fixture_app();
        let req = Request::builder()
            .method(Method::POST)
            .uri(PATH)
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"action":"batch","items":[{"domain":"PF","survey_t":55},{"domain":"PF","survey_t":1e400}]}"#,
            ))
            .unwrap();
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["calibrated_t"], json!(1.05 * 55.0 + -2.0));
        assert_eq!(items[1]["error"], "invalid");
        assert!(items[1].get("calibrated_t").is_none());
    }

    #[tokio::test]
    async fn post_batch_without_items_is_empty_array() {
        let (_dir, app) = fixture_app();
        let (status, body) = send(app, post(json!({"action": "batch", "items": "nope"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn post_route_decisions() {
        let (_dir, app) = fixture_app();
        let (status, body) = send(
            app.clone(),
            post(json!({"action": "route", "domain": "A", "interim_se": 6})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"domain": "A", "extra_items": 4, "reason": "second_pass"}));

        let (_, body) = send(app.clone(), post(json!({"action": "route", "domain": "PF", "interim_se": 3}))).await;
        assert_eq!(body, json!({"domain": "PF", "extra_items": 0, "reason": "stable"}));

        let (_, body) = send(app.clone(), post(json!({"action": "route", "domain": "PF", "interim_se": 5}))).await;
        assert_eq!(body, json!({"domain": "PF", "extra_items": 1, "reason": "high_se"}));

        let (status, body) = send(app, post(json!({"action": "route", "domain": "Q"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid domain"}));
    }

    #[tokio::test]
    async fn unknown_or_missing_action_is_bad_request() {
        let (_dir, app) = fixture_app();
        let (status, body) = send(app.clone(), post(json!({"action": "rescore"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Unknown action"}));

        let garbage = Request::builder()
            .method(Method::POST)
            .uri(PATH)
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(app, garbage).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Unknown action"}));
    }

    #[tokio::test]
    async fn other_methods_are_not_allowed() {
        let (_dir, app) = fixture_app();
        for method in [Method::PUT, Method::DELETE, Method::PATCH] {
            let req = Request::builder().method(method).uri(PATH).body(Body::empty()).unwrap();
            let (status, body) = send(app.clone(), req).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(body, json!({"error": "Method Not Allowed"}));
        }
    }

    #[tokio::test]
    async fn broken_model_dir_is_invocation_failure() {
        let dir = tempfile::tempdir().unwrap();
        fixtures::write_model(dir.path());
        let app = app_for(dir.path(), ReloadPolicy::PerRequest);
        std::fs::write(dir.path().join(crate::io::MODEL_CONFIG_FILE), "{").unwrap();

        let req = Request::builder().uri(PATH).body(Body::empty()).unwrap();
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], INVOCATION_FAILED);
        assert!(body["message"].as_str().unwrap().contains("model_config.json"));
    }

    #[tokio::test]
    async fn startup_snapshot_survives_file_removal() {
        let dir = tempfile::tempdir().unwrap();
        fixtures::write_model(dir.path());
        let app = app_for(dir.path(), ReloadPolicy::Startup);
        std::fs::remove_file(dir.path().join(crate::io::MODEL_CONFIG_FILE)).unwrap();

        let (status, _) = send(app, post(json!({"action": "score", "domain": "D", "survey_t": 60}))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn server_config_defaults() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.route_path, "/api/model");
        assert_eq!(cfg.reload, ReloadPolicy::PerRequest);
    }
}
