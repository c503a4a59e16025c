use std::path::Path;

/// Errors from reading, parsing, or validating the model directory.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("IO error reading {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid JSON for its schema.
    #[error("Parse error in {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// A listed domain has no `calibration` entry.
    #[error("No calibration entry for domain {0}")]
    MissingCalibration(crate::domain::Domain),

    /// One or more semantic rules failed; every violation, one per line.
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl ConfigError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        ConfigError::Io {
            file: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn parse(path: &Path, source: serde_json::Error) -> Self {
        ConfigError::Parse {
            file: path.display().to_string(),
            source,
        }
    }
}

/// Binary-level error: a message plus the process exit code.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(2, err.to_string())
    }
}
