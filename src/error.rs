use crate::config::ConfigError;
use thiserror::Error;

/// Top-level error type for the appsettings-host library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to create context: {0}")]
    Context(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps an error raised while building a context.
    pub fn context(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Context(err.into())
    }
}
