pub mod config;
pub mod context;
pub mod diagnostics;
mod error;

pub use config::{ConfigError, ConfigurationResolver, ResolvedConfiguration, Settings};
pub use context::{ConfiguredFactory, ContextFactory, FnFactory};
pub use error::Error;
