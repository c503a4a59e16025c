//! Tracing subscriber setup.
//!
//! `RUST_LOG` controls filtering (default `info`); `LOG_FORMAT=json` switches
//! to structured output, anything else gives the human-readable format.

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Install the global subscriber. Fails if one is already set.
pub fn init_tracing() -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = std::env::var("LOG_FORMAT").unwrap_or_default();

    let result = match format.as_str() {
        "json" => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .try_init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init(),
    };

    result.map_err(|e| AppError::new(4, format!("tracing init failed: {e}")))
}
