//! Where request handlers get their `Model` from.
//!
//! The reload policy is an explicit choice made at startup:
//! - `startup`: load once, serve that snapshot until restart
//! - `per-request`: reload the directory for every request, so edits show up
//!   immediately and a broken directory surfaces as a 500 on each call

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::Model;
use crate::error::ConfigError;
use crate::io::load_model;

/// When the model directory is (re)read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReloadPolicy {
    /// Read once when the server starts.
    Startup,
    /// Read on every request.
    PerRequest,
}

/// Resolved model provider for the HTTP layer.
#[derive(Debug, Clone)]
pub enum ModelSource {
    Static(Arc<Model>),
    PerRequest(PathBuf),
}

impl ModelSource {
    /// Build a source for `dir`. With [`ReloadPolicy::Startup`] the model is
    /// loaded (and validated) here, so a broken directory fails fast.
    pub fn open(dir: &Path, policy: ReloadPolicy) -> Result<Self, ConfigError> {
        match policy {
            ReloadPolicy::Startup => {
                let model = load_model(dir)?;
                info!(
                    dir = %dir.display(),
                    version = %model.config.version,
                    "model loaded once at startup"
                );
                Ok(ModelSource::Static(Arc::new(model)))
            }
            ReloadPolicy::PerRequest => {
                info!(dir = %dir.display(), "model will be reloaded on every request");
                Ok(ModelSource::PerRequest(dir.to_path_buf()))
            }
        }
    }

    /// The model to serve the current request with.
    pub async fn current(&self) -> Result<Arc<Model>, ConfigError> {
        match self {
            ModelSource::Static(model) => Ok(Arc::clone(model)),
            ModelSource::PerRequest(dir) => {
                let load_dir = dir.clone();
                tokio::task::spawn_blocking(move || load_model(&load_dir))
                    .await
                    .map_err(|e| ConfigError::io(dir, std::io::Error::other(e)))?
                    .map(Arc::new)
            }
        }
    }
}
