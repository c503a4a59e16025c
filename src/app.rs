//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs the tracing subscriber
//! - parses CLI arguments
//! - serves HTTP, or runs one operation against the model directory and
//!   prints the JSON result

use clap::Parser;
use serde::Serialize;

use crate::cli::{Command, ModelArgs, RouteArgs, ScoreArgs, ServeArgs};
use crate::error::AppError;
use crate::io::load_model;
use crate::server::ServerConfig;
use crate::service::{RequestError, RouteInput, route, score};

/// Entry point for the `tcal` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    crate::telemetry::init_tracing()?;

    match cli.command {
        Command::Serve(args) => handle_serve(args),
        Command::Score(args) => handle_score(args),
        Command::Route(args) => handle_route(args),
        Command::Check(args) => handle_check(args),
    }
}

fn handle_serve(args: ServeArgs) -> Result<(), AppError> {
    let config = server_config_from_args(&args);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::new(4, format!("Failed to start runtime: {e}")))?;
    runtime.block_on(crate::server::start_server(config))
}

fn handle_score(args: ScoreArgs) -> Result<(), AppError> {
    let model = load_model(&args.model.model_dir)?;
    let out = score(&model, args.domain, args.survey_t).map_err(request_error)?;
    print_json(&out)
}

fn handle_route(args: RouteArgs) -> Result<(), AppError> {
    let model = load_model(&args.model.model_dir)?;
    let input = RouteInput {
        domain: args.domain,
        interim_se: args.interim_se,
        theta_t: args.theta_t,
        discordant: args.discordant,
    };
    let out = route(&model, input).map_err(request_error)?;
    print_json(&out)
}

fn handle_check(args: ModelArgs) -> Result<(), AppError> {
    let model = load_model(&args.model_dir)?;
    println!("{}", crate::report::format_model_summary(&model));
    Ok(())
}

pub fn server_config_from_args(args: &ServeArgs) -> ServerConfig {
    ServerConfig {
        host: args.host.clone(),
        port: args.port,
        route_path: args.route_path.clone(),
        model_dir: args.model.model_dir.clone(),
        reload: args.reload,
        max_request_size: args.max_request_size,
    }
}

fn request_error(err: RequestError) -> AppError {
    match err {
        RequestError::Model(e) => e.into(),
        other => AppError::new(3, other.to_string()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::new(4, format!("Failed to serialize output: {e}")))?;
    println!("{text}");
    Ok(())
}
