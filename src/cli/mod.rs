//! Command-line parsing.
//!
//! Keeps argument parsing separate from the scoring code. Every option that
//! matters in deployment also reads an environment variable (a `.env` file is
//! loaded first).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Domain;
use crate::server::ReloadPolicy;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "tcal", version, about = "Survey T-score calibration and routing service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the calibration endpoint over HTTP.
    Serve(ServeArgs),
    /// Calibrate one survey T-score and print the result as JSON.
    Score(ScoreArgs),
    /// Print the routing recommendation for one domain as JSON.
    Route(RouteArgs),
    /// Load and validate the model directory, then print a summary.
    Check(ModelArgs),
}

/// Location of the model files.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Directory with `model_config.json` and the crosswalk files.
    #[arg(long, env = "TCAL_MODEL_DIR", default_value = "model")]
    pub model_dir: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Address to bind.
    #[arg(long, env = "TCAL_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, env = "TCAL_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Path the endpoint is mounted on.
    #[arg(long, env = "TCAL_ROUTE_PATH", default_value = "/api/model")]
    pub route_path: String,

    /// When to (re)read the model directory.
    #[arg(long, env = "TCAL_RELOAD", value_enum, default_value_t = ReloadPolicy::PerRequest)]
    pub reload: ReloadPolicy,

    /// Maximum request body size in bytes.
    #[arg(long, default_value_t = 1024 * 1024)]
    pub max_request_size: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Domain code (PF, PI, F, SR, A, D).
    #[arg(short, long)]
    pub domain: Domain,

    /// Survey T-score.
    #[arg(short = 't', long = "survey-t", allow_negative_numbers = true)]
    pub survey_t: f64,
}

#[derive(Debug, Args, Clone)]
pub struct RouteArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Domain code (PF, PI, F, SR, A, D).
    #[arg(short, long)]
    pub domain: Domain,

    /// Standard error of the interim estimate.
    #[arg(long = "se", default_value_t = 0.0)]
    pub interim_se: f64,

    /// Current ability estimate on the T scale.
    #[arg(long = "theta", default_value_t = crate::service::DEFAULT_THETA_T, allow_negative_numbers = true)]
    pub theta_t: f64,

    /// Flag the response pattern as discordant.
    #[arg(long)]
    pub discordant: bool,
}
