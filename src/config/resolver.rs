//! Layered host configuration.
//!
//! [`ConfigurationResolver::resolve`] merges, from lowest to highest precedence:
//!
//! 1. process environment variables,
//! 2. command-line arguments,
//! 3. `appsettings.json` from the base directory (required),
//! 4. `appsettings.<Environment>.json` from the base directory (optional).
//!
//! The environment name comes from the `environment` command-line key, then the
//! `ASPNETCORE_ENVIRONMENT` variable, then defaults to `Production`.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use super::builder::ConfigBuilder;
use super::command_line::CommandLineSource;
use super::env::{EnvSource, EnvVars};
use super::environment::{resolve_environment_name, EnvironmentName};
use super::map::ConfigMap;
use super::settings::Settings;
use super::source::ConfigSource;
use super::ConfigError;
use crate::diagnostics::{DiagnosticSink, StdoutSink};

/// Name of the required base settings file.
pub const BASE_SETTINGS_FILE: &str = "appsettings.json";

/// Outcome of one [`ConfigurationResolver::resolve`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfiguration {
    values: ConfigMap,
    environment: EnvironmentName,
    base_path: PathBuf,
}

impl ResolvedConfiguration {
    /// The merged key/value view.
    pub fn values(&self) -> &ConfigMap {
        &self.values
    }

    /// Environment used to pick the environment-specific settings file.
    pub fn environment(&self) -> &EnvironmentName {
        &self.environment
    }

    /// Directory the settings files were read from.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key)
    }

    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.values.require(key)
    }

    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.values.get_parsed(key)
    }

    pub fn connection_string(&self, name: &str) -> Option<&str> {
        self.values.connection_string(name)
    }

    pub fn section(&self, prefix: &str) -> ConfigMap {
        self.values.section(prefix)
    }
}

/// Resolves the host configuration for a set of process arguments.
///
/// The resolver holds no mutable state; `resolve` may be called repeatedly
/// and from several threads.
///
/// ## Example
///
/// ```no_run
/// use appsettings_host::config::{ConfigurationResolver, Settings};
///
/// let args: Vec<String> = std::env::args().skip(1).collect();
/// let config = ConfigurationResolver::new(Settings::default()).resolve(&args)?;
///
/// println!("environment: {}", config.environment());
/// println!("db: {:?}", config.connection_string("Default"));
/// # Ok::<(), appsettings_host::ConfigError>(())
/// ```
#[derive(Clone)]
pub struct ConfigurationResolver {
    settings: Settings,
    sink: Arc<dyn DiagnosticSink>,
    env: EnvVars,
    base_path: Option<PathBuf>,
}

impl std::fmt::Debug for ConfigurationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationResolver")
            .field("settings", &self.settings)
            .field("env", &self.env)
            .field("base_path", &self.base_path)
            .finish_non_exhaustive()
    }
}

impl Default for ConfigurationResolver {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl ConfigurationResolver {
    /// Creates a resolver that reads the live process environment and the
    /// current working directory, printing progress to standard output unless
    /// `settings.logging_disabled` is set.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            sink: Arc::new(StdoutSink),
            env: EnvVars::Process,
            base_path: None,
        }
    }

    /// Sends progress lines to `sink` instead of standard output.
    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Shares an existing sink.
    pub fn with_shared_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Reads environment variables from `env` instead of the process.
    pub fn with_env_vars(mut self, env: EnvVars) -> Self {
        self.env = env;
        self
    }

    /// Reads settings files from `path` instead of the working directory.
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Builds the merged configuration for `args`.
    ///
    /// Fails if `appsettings.json` is missing, or if either settings file
    /// cannot be read or parsed. A missing environment-specific file is not an
    /// error.
    pub fn resolve<S: AsRef<str>>(&self, args: &[S]) -> Result<ResolvedConfiguration, ConfigError> {
        self.emit(" ---> Resolving host configuration");
        if !args.is_empty() {
            self.emit(" ---> Command line arguments:");
            for arg in args {
                self.emit(&format!("      {}", arg.as_ref()));
            }
            self.emit("");
        }

        let base_path = self.base_path()?;
        self.emit(&format!(" ---> Base path is {}", base_path.display()));

        // Parsed once; used both to pick the environment and as a layer.
        let command_line = CommandLineSource::new(args).entries()?;
        let environment = resolve_environment_name(&command_line, &self.env);
        self.emit(&format!(" ---> Environment is {environment}"));

        tracing::debug!(
            environment = %environment,
            base_path = %base_path.display(),
            arguments = args.len(),
            "resolving host configuration"
        );

        let values = ConfigBuilder::new()
            .with_source(EnvSource::new(self.env.clone()))
            .with_entries("command line", command_line)
            .with_json_file(base_path.join(BASE_SETTINGS_FILE), true)
            .with_json_file(base_path.join(environment.settings_file_name()), false)
            .build()?;

        Ok(ResolvedConfiguration {
            values,
            environment,
            base_path,
        })
    }

    /// Pinned base path, or the working directory at the time of the call.
    fn base_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.base_path {
            Some(path) => Ok(path.clone()),
            None => std::env::current_dir().map_err(ConfigError::WorkingDirectory),
        }
    }

    fn emit(&self, line: &str) {
        if !self.settings.logging_disabled {
            self.sink.line(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENVIRONMENT_VARIABLE;
    use crate::diagnostics::MemorySink;
    use std::fs;
    use tempfile::TempDir;

    const NO_ARGS: &[&str] = &[];

    fn settings_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, contents) in files {
            fs::write(dir.path().join(name), contents).unwrap();
        }
        dir
    }

    fn resolver(dir: &TempDir, vars: &[(&str, &str)]) -> ConfigurationResolver {
        ConfigurationResolver::new(Settings::quiet())
            .with_base_path(dir.path())
            .with_env_vars(EnvVars::fixed(vars.iter().copied()))
    }

    #[test]
    fn test_defaults_to_production_without_environment_file() {
        let dir = settings_dir(&[("appsettings.json", r#"{ "a": 1 }"#)]);

        let config = resolver(&dir, &[]).resolve(NO_ARGS).unwrap();

        assert_eq!(config.environment().as_str(), "Production");
        assert_eq!(config.get("a"), Some("1"));
        assert_eq!(config.values().len(), 1);
        assert_eq!(config.base_path(), dir.path());
    }

    #[test]
    fn test_command_line_environment_selects_file() {
        let dir = settings_dir(&[
            ("appsettings.json", r#"{ "a": 1 }"#),
            ("appsettings.Staging.json", r#"{ "a": 2 }"#),
        ]);

        let config = resolver(&dir, &[(ENVIRONMENT_VARIABLE, "Dev")])
            .resolve(&["--environment=Staging"])
            .unwrap();

        assert_eq!(config.environment().as_str(), "Staging");
        assert_eq!(config.get("a"), Some("2"));
    }

    #[test]
    fn test_variable_environment_selects_file() {
        let dir = settings_dir(&[
            ("appsettings.json", r#"{ "x": "base" }"#),
            ("appsettings.Dev.json", r#"{ "x": "dev" }"#),
        ]);

        let config = resolver(&dir, &[(ENVIRONMENT_VARIABLE, "Dev")])
            .resolve(NO_ARGS)
            .unwrap();

        assert_eq!(config.environment().as_str(), "Dev");
        assert_eq!(config.get("x"), Some("dev"));
    }

    #[test]
    fn test_precedence_chain() {
        let dir = settings_dir(&[
            (
                "appsettings.json",
                r#"{ "FromBase": "base", "FileOverCli": "base", "EnvFile": "base" }"#,
            ),
            ("appsettings.Production.json", r#"{ "EnvFile": "production" }"#),
        ]);
        let vars = [
            ("OnlyEnv", "env"),
            ("CliOverEnv", "env"),
            ("FileOverCli", "env"),
        ];

        let config = resolver(&dir, &vars)
            .resolve(&["--CliOverEnv=cli", "--fileovercli=cli"])
            .unwrap();

        assert_eq!(config.get("OnlyEnv"), Some("env"));
        assert_eq!(config.get("CliOverEnv"), Some("cli"));
        assert_eq!(config.get("FileOverCli"), Some("base"));
        assert_eq!(config.get("FromBase"), Some("base"));
        assert_eq!(config.get("EnvFile"), Some("production"));
    }

    #[test]
    fn test_environment_argument_is_also_a_layer() {
        let dir = settings_dir(&[("appsettings.json", "{}")]);

        let config = resolver(&dir, &[])
            .resolve(&["--environment", "Development"])
            .unwrap();

        assert_eq!(config.get("environment"), Some("Development"));
        assert!(config.environment().is_development());
    }

    #[test]
    fn test_missing_base_file_fails() {
        let dir = settings_dir(&[("appsettings.Production.json", "{}")]);

        let result = resolver(&dir, &[]).resolve(NO_ARGS);

        match result {
            Err(ConfigError::MissingRequiredSource(path)) => {
                assert_eq!(path, dir.path().join("appsettings.json"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_environment_file_fails() {
        let dir = settings_dir(&[
            ("appsettings.json", "{}"),
            ("appsettings.Production.json", "{ not json"),
        ]);

        let result = resolver(&dir, &[]).resolve(NO_ARGS);

        match result {
            Err(ConfigError::MalformedSource { path, .. }) => {
                assert_eq!(path, dir.path().join("appsettings.Production.json"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_connection_strings_from_every_layer() {
        let dir = settings_dir(&[(
            "appsettings.json",
            r#"{ "ConnectionStrings": { "Main": "Host=file" } }"#,
        )]);

        let config = resolver(&dir, &[("SQLCONNSTR_Reporting", "Host=env")])
            .resolve(NO_ARGS)
            .unwrap();

        assert_eq!(config.connection_string("Main"), Some("Host=file"));
        assert_eq!(config.connection_string("Reporting"), Some("Host=env"));
        assert_eq!(
            config.get("ConnectionStrings:Reporting_ProviderName"),
            Some("System.Data.SqlClient")
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let dir = settings_dir(&[
            ("appsettings.json", r#"{ "a": { "b": [1, 2] }, "c": true }"#),
            ("appsettings.Production.json", r#"{ "c": false }"#),
        ]);
        let resolver = resolver(&dir, &[("X", "1"), ("Y__Z", "2")]);

        let first = resolver.resolve(&["--k=v"]).unwrap();
        let second = resolver.resolve(&["--k=v"]).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_diagnostic_lines() {
        let dir = settings_dir(&[("appsettings.json", "{}")]);
        let sink = Arc::new(MemorySink::new());

        ConfigurationResolver::new(Settings::default())
            .with_base_path(dir.path())
            .with_env_vars(EnvVars::Fixed(vec![]))
            .with_shared_sink(sink.clone())
            .resolve(&["--environment=Test", "--a=1"])
            .unwrap();

        let lines = sink.lines();
        assert_eq!(lines[0], " ---> Resolving host configuration");
        assert_eq!(lines[1], " ---> Command line arguments:");
        assert_eq!(lines[2], "      --environment=Test");
        assert_eq!(lines[3], "      --a=1");
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], format!(" ---> Base path is {}", dir.path().display()));
        assert_eq!(lines[6], " ---> Environment is Test");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_diagnostic_lines_without_arguments() {
        let dir = settings_dir(&[("appsettings.json", "{}")]);
        let sink = Arc::new(MemorySink::new());

        ConfigurationResolver::new(Settings::default())
            .with_base_path(dir.path())
            .with_env_vars(EnvVars::Fixed(vec![]))
            .with_shared_sink(sink.clone())
            .resolve(NO_ARGS)
            .unwrap();

        let lines = sink.lines();
        assert_eq!(lines.len(), 3);
        assert!(!lines.iter().any(|l| l.contains("Command line arguments")));
    }

    #[test]
    fn test_logging_disabled_is_silent() {
        let dir = settings_dir(&[("appsettings.json", "{}")]);
        let sink = Arc::new(MemorySink::new());

        ConfigurationResolver::new(Settings::quiet())
            .with_base_path(dir.path())
            .with_env_vars(EnvVars::Fixed(vec![]))
            .with_shared_sink(sink.clone())
            .resolve(&["--a=1"])
            .unwrap();

        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_serializes_with_environment() {
        let dir = settings_dir(&[("appsettings.json", r#"{ "a": "1" }"#)]);
        let config = resolver(&dir, &[]).resolve(NO_ARGS).unwrap();

        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(json["values"], serde_json::json!({ "a": "1" }));
        assert_eq!(json["environment"], "Production");
    }
}
