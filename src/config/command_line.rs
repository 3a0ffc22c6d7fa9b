//! Command-line configuration layer.
//!
//! Recognized forms:
//!
//! | Token(s)            | Result        |
//! |---------------------|---------------|
//! | `key=value`         | `key = value` |
//! | `--key=value`       | `key = value` |
//! | `--key value`       | `key = value` |
//! | `/key=value`        | `key = value` |
//! | `/key value`        | `key = value` |
//! | `-k value` (mapped) | `mapped = value` |
//!
//! Anything else is skipped.

use std::collections::HashMap;

use super::source::{normalize_key, ConfigEntry, ConfigSource};
use super::ConfigError;

#[derive(Debug, Clone, Default)]
pub struct CommandLineSource {
    args: Vec<String>,
    switch_mappings: Vec<(String, String)>,
}

impl CommandLineSource {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            args: args.into_iter().map(|a| a.as_ref().to_string()).collect(),
            switch_mappings: Vec::new(),
        }
    }

    /// Maps a switch such as `-e` or `--env` to a configuration key.
    ///
    /// Switches must start with `-` or `--`; lookups are case-insensitive.
    pub fn with_switch_mapping(mut self, switch: impl Into<String>, key: impl Into<String>) -> Self {
        self.switch_mappings.push((switch.into(), key.into()));
        self
    }

    fn mappings(&self) -> Result<HashMap<String, &str>, ConfigError> {
        let mut mappings = HashMap::with_capacity(self.switch_mappings.len());
        for (switch, key) in &self.switch_mappings {
            if !switch.starts_with('-') {
                return Err(ConfigError::InvalidSwitchMapping(format!(
                    "switch '{switch}' must start with '-' or '--'"
                )));
            }
            if mappings.insert(normalize_key(switch), key.as_str()).is_some() {
                return Err(ConfigError::InvalidSwitchMapping(format!(
                    "switch '{switch}' is mapped more than once"
                )));
            }
        }
        Ok(mappings)
    }
}

impl ConfigSource for CommandLineSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        let mappings = self.mappings()?;
        let mut entries = Vec::new();
        let mut tokens = self.args.iter();

        while let Some(token) = tokens.next() {
            // `/key` is an alias for `--key`.
            let arg = match token.strip_prefix('/') {
                Some(rest) => format!("--{rest}"),
                None => token.clone(),
            };
            let key_start = if arg.starts_with("--") {
                2
            } else if arg.starts_with('-') {
                1
            } else {
                0
            };

            let (key, value) = match arg.find('=') {
                Some(eq) => {
                    let switch = &arg[..eq];
                    let key = match mappings.get(&normalize_key(switch)) {
                        Some(mapped) => mapped.to_string(),
                        None if key_start == 1 => continue,
                        None => arg[key_start..eq].to_string(),
                    };
                    (key, arg[eq + 1..].to_string())
                }
                None => {
                    if key_start == 0 {
                        continue;
                    }
                    let key = match mappings.get(&normalize_key(&arg)) {
                        Some(mapped) => mapped.to_string(),
                        None if key_start == 1 => continue,
                        None => arg[key_start..].to_string(),
                    };
                    let Some(value) = tokens.next() else {
                        continue;
                    };
                    (key, value.clone())
                }
            };

            if key.is_empty() {
                continue;
            }
            entries.push(ConfigEntry::new(key, value));
        }

        Ok(entries)
    }

    fn name(&self) -> String {
        "command line".to_string()
    }
}
