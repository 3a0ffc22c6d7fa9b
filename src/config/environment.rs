//! Selection of the active deployment environment.

use std::fmt;

use serde::Serialize;

use super::env::EnvVars;
use super::source::{normalize_key, ConfigEntry};

/// Command-line key that selects the environment.
pub const ENVIRONMENT_KEY: &str = "environment";

/// Process variable consulted when the command line names no environment.
pub const ENVIRONMENT_VARIABLE: &str = "ASPNETCORE_ENVIRONMENT";

/// Name of the active deployment environment, e.g. `Development`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EnvironmentName(String);

impl EnvironmentName {
    pub const DEVELOPMENT: &'static str = "Development";
    pub const STAGING: &'static str = "Staging";
    pub const PRODUCTION: &'static str = "Production";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against another environment name.
    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }

    pub fn is_development(&self) -> bool {
        self.is(Self::DEVELOPMENT)
    }

    pub fn is_staging(&self) -> bool {
        self.is(Self::STAGING)
    }

    pub fn is_production(&self) -> bool {
        self.is(Self::PRODUCTION)
    }

    /// File name of this environment's settings file.
    pub fn settings_file_name(&self) -> String {
        format!("appsettings.{}.json", self.0)
    }
}

impl Default for EnvironmentName {
    fn default() -> Self {
        Self::new(Self::PRODUCTION)
    }
}

impl fmt::Display for EnvironmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EnvironmentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Picks the environment name.
///
/// Order: the last non-empty `environment` entry on the command line, then a
/// non-empty [`ENVIRONMENT_VARIABLE`], then `Production`.
pub fn resolve_environment_name(command_line: &[ConfigEntry], env: &EnvVars) -> EnvironmentName {
    let wanted = normalize_key(ENVIRONMENT_KEY);
    let from_command_line = command_line
        .iter()
        .rev()
        .find(|entry| normalize_key(&entry.key) == wanted)
        .map(|entry| entry.value.clone())
        .filter(|value| !value.is_empty());

    from_command_line
        .or_else(|| env.get(ENVIRONMENT_VARIABLE).filter(|value| !value.is_empty()))
        .map(EnvironmentName::new)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(pairs: &[(&str, &str)]) -> Vec<ConfigEntry> {
        pairs.iter().map(|(k, v)| ConfigEntry::new(*k, *v)).collect()
    }

    #[test]
    fn test_command_line_wins_over_variable() {
        let env = EnvVars::fixed([(ENVIRONMENT_VARIABLE, "Dev")]);
        let name = resolve_environment_name(&cli(&[("environment", "Staging")]), &env);
        assert_eq!(name.as_str(), "Staging");
    }

    #[test]
    fn test_command_line_key_is_case_insensitive() {
        let name = resolve_environment_name(&cli(&[("Environment", "QA")]), &EnvVars::Fixed(vec![]));
        assert_eq!(name.as_str(), "QA");
    }

    #[test]
    fn test_last_command_line_value_wins() {
        let entries = cli(&[("environment", "A"), ("environment", "B")]);
        let name = resolve_environment_name(&entries, &EnvVars::Fixed(vec![]));
        assert_eq!(name.as_str(), "B");
    }

    #[test]
    fn test_falls_back_to_variable() {
        let env = EnvVars::fixed([(ENVIRONMENT_VARIABLE, "Dev")]);
        let name = resolve_environment_name(&cli(&[("other", "x")]), &env);
        assert_eq!(name.as_str(), "Dev");
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let env = EnvVars::fixed([(ENVIRONMENT_VARIABLE, "Dev")]);
        let name = resolve_environment_name(&cli(&[("environment", "")]), &env);
        assert_eq!(name.as_str(), "Dev");

        let env = EnvVars::fixed([(ENVIRONMENT_VARIABLE, "")]);
        let name = resolve_environment_name(&[], &env);
        assert!(name.is_production());
    }

    #[test]
    fn test_defaults_to_production() {
        let name = resolve_environment_name(&[], &EnvVars::Fixed(vec![]));
        assert_eq!(name.as_str(), "Production");
        assert_eq!(name.settings_file_name(), "appsettings.Production.json");
    }

    #[test]
    fn test_helpers_ignore_case() {
        assert!(EnvironmentName::new("development").is_development());
        assert!(EnvironmentName::new("STAGING").is_staging());
        assert!(!EnvironmentName::new("Dev").is_development());
    }
}
