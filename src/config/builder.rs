use std::path::Path;

use super::command_line::CommandLineSource;
use super::env::{EnvSource, EnvVars};
use super::file::JsonFileSource;
use super::map::ConfigMap;
use super::source::{ConfigEntry, ConfigSource};
use super::ConfigError;

/// Entries that were produced ahead of time.
#[derive(Debug)]
struct Preloaded {
    name: String,
    entries: Vec<ConfigEntry>,
}

impl ConfigSource for Preloaded {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        Ok(self.entries.clone())
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

/// Builder for merging configuration layers into a [`ConfigMap`].
///
/// Layers are merged in registration order, with later layers overriding
/// earlier ones. Keys compare case-insensitively.
///
/// ## Example
///
/// ```no_run
/// use appsettings_host::config::{ConfigBuilder, EnvVars};
///
/// let config = ConfigBuilder::new()
///     .with_env(EnvVars::Process)
///     .with_command_line(std::env::args().skip(1))
///     .with_json_file("appsettings.json", true)
///     .with_json_file("appsettings.Development.json", false)
///     .build()?;
///
/// let port: Option<u16> = config.get_parsed("Server:Port")?;
/// # Ok::<(), appsettings_host::ConfigError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct ConfigBuilder {
    sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an arbitrary layer.
    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Adds already-parsed entries as a layer.
    pub fn with_entries(self, name: impl Into<String>, entries: Vec<ConfigEntry>) -> Self {
        self.with_source(Preloaded {
            name: name.into(),
            entries,
        })
    }

    /// Adds every environment variable as a layer.
    pub fn with_env(self, vars: EnvVars) -> Self {
        self.with_source(EnvSource::new(vars))
    }

    /// Adds command-line arguments as a layer.
    pub fn with_command_line<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.with_source(CommandLineSource::new(args))
    }

    /// Adds a JSON settings file.
    ///
    /// If `required` is `true`, the build will fail if the file doesn't exist.
    /// Optional files that are missing are silently skipped.
    pub fn with_json_file(self, path: impl AsRef<Path>, required: bool) -> Self {
        self.with_source(JsonFileSource::new(path, required))
    }

    /// Loads every layer and merges them.
    pub fn build(self) -> Result<ConfigMap, ConfigError> {
        let mut merged = ConfigMap::new();

        for source in &self.sources {
            let entries = source.entries()?;
            tracing::trace!(source = %source.name(), entries = entries.len(), "merging layer");
            merged.extend(entries);
        }

        Ok(merged)
    }
}
