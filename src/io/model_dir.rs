//! Read the model directory.
//!
//! Layout:
//! - `<dir>/model_config.json` — the `ModelConfig` document
//! - `<dir>/<calibration[domain].file>` — one crosswalk per listed domain
//!
//! A successfully loaded `Model` has always passed `validation::validate`.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{Model, ModelConfig, Xwalk};
use crate::error::ConfigError;
use crate::io::validation;

/// File name of the configuration document inside the model directory.
pub const MODEL_CONFIG_FILE: &str = "model_config.json";

/// Load config and crosswalks from `dir`, then validate them.
pub fn load_model(dir: &Path) -> Result<Model, ConfigError> {
    let config: ModelConfig = read_json(&dir.join(MODEL_CONFIG_FILE))?;

    let mut xwalks = HashMap::with_capacity(config.domains.len());
    for &domain in &config.domains {
        let entry = config
            .calibration
            .get(&domain)
            .ok_or(ConfigError::MissingCalibration(domain))?;
        let xwalk: Xwalk = read_json(&dir.join(&entry.file))?;
        xwalks.insert(domain, xwalk);
    }

    let model = Model { config, xwalks };
    validation::validate(&model).map_err(|errors| ConfigError::Validation(errors.join("\n")))?;

    debug!(
        dir = %dir.display(),
        version = %model.config.version,
        domains = model.config.domains.len(),
        "model loaded"
    );
    Ok(model)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let file = File::open(path).map_err(|e| ConfigError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| ConfigError::parse(path, e))
}
