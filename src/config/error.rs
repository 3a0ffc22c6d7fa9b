use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("required settings file not found: {0}")]
    MissingRequiredSource(PathBuf),

    #[error("failed to read settings file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings file '{path}': {source}")]
    MalformedSource {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to determine the working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),

    #[error("invalid switch mapping: {0}")]
    InvalidSwitchMapping(String),

    #[error("configuration key not found: {0}")]
    MissingKey(String),

    #[error("invalid value '{value}' for key '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}
