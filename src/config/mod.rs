//! Layered configuration loading.

mod builder;
mod command_line;
mod env;
mod environment;
mod error;
mod file;
mod map;
mod resolver;
mod settings;
mod source;

pub use builder::ConfigBuilder;
pub use command_line::CommandLineSource;
pub use env::{EnvSource, EnvVars};
pub use environment::{
    resolve_environment_name, EnvironmentName, ENVIRONMENT_KEY, ENVIRONMENT_VARIABLE,
};
pub use error::ConfigError;
pub use file::JsonFileSource;
pub use map::ConfigMap;
pub use resolver::{ConfigurationResolver, ResolvedConfiguration, BASE_SETTINGS_FILE};
pub use settings::Settings;
pub use source::{ConfigEntry, ConfigSource, KEY_DELIMITER};
