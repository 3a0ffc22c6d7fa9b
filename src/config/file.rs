//! JSON settings file source.

use std::path::{Path, PathBuf};

use serde::de::Error as _;
use serde_json::Value;

use super::source::{join_key, ConfigEntry, ConfigSource};
use super::ConfigError;

/// A configuration source that loads a JSON settings file.
///
/// Files can be marked as required or optional. Required files that don't exist
/// cause an error; optional files that don't exist are silently skipped. A file
/// that exists but does not hold a JSON object is an error either way.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    required: bool,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>, required: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for JsonFileSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        match load_settings_file(&self.path, self.required)? {
            Some(root) => {
                let mut entries = Vec::new();
                flatten(&root, "", &mut entries);
                Ok(entries)
            }
            None => {
                tracing::debug!(path = %self.path.display(), "optional settings file not present");
                Ok(vec![])
            }
        }
    }

    fn name(&self) -> String {
        self.path.display().to_string()
    }
}

/// Loads and parses a JSON settings file.
///
/// Returns `Ok(None)` if the file doesn't exist and `required` is false.
fn load_settings_file(path: &Path, required: bool) -> Result<Option<Value>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let malformed = |source: serde_json::Error| ConfigError::MalformedSource {
                path: path.to_path_buf(),
                source,
            };
            let contents = contents.strip_prefix('\u{feff}').unwrap_or(&contents);
            let root: Value = serde_json::from_str(contents).map_err(malformed)?;
            if !root.is_object() {
                return Err(malformed(serde_json::Error::custom(
                    "top-level JSON element must be an object",
                )));
            }
            Ok(Some(root))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                Err(ConfigError::MissingRequiredSource(path.to_path_buf()))
            } else {
                Ok(None)
            }
        }
        Err(e) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Flattens a JSON document into `:`-joined keys.
fn flatten(value: &Value, prefix: &str, out: &mut Vec<ConfigEntry>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten(child, &join_key(prefix, key), out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                flatten(child, &join_key(prefix, &index.to_string()), out);
            }
        }
        _ if prefix.is_empty() => {}
        Value::String(s) => out.push(ConfigEntry::new(prefix, s.as_str())),
        // Built with `arbitrary_precision`, so this is the number's source text.
        Value::Number(n) => out.push(ConfigEntry::new(prefix, n.to_string())),
        Value::Bool(b) => out.push(ConfigEntry::new(prefix, b.to_string())),
        // null, {} and []
        _ => out.push(ConfigEntry::new(prefix, "")),
    }
}
