//! Flat, ordered view over merged configuration entries.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::source::{join_key, normalize_key, ConfigEntry, KEY_DELIMITER};
use super::ConfigError;

/// Case-insensitive key/value mapping, ordered by key.
///
/// Inserting a key that already exists under any casing replaces both its
/// value and its stored spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMap {
    entries: BTreeMap<String, ConfigEntry>,
}

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: ConfigEntry) {
        self.entries.insert(normalize_key(&entry.key), entry);
    }

    /// Returns the value stored under `key`, compared case-insensitively.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&normalize_key(key))
            .map(|entry| entry.value.as_str())
    }

    /// Like [`get`](Self::get), but a missing key is an error.
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    /// Parses the value under `key` with [`FromStr`].
    ///
    /// Returns `Ok(None)` when the key is absent.
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
                reason: e.to_string(),
            })
    }

    /// Reads a boolean, accepting `true`/`false` in any casing.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        match value.trim() {
            v if v.eq_ignore_ascii_case("true") => Ok(Some(true)),
            v if v.eq_ignore_ascii_case("false") => Ok(Some(false)),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
                reason: "expected 'true' or 'false'".to_string(),
            }),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&normalize_key(key))
    }

    /// Shorthand for `ConnectionStrings:<name>`.
    pub fn connection_string(&self, name: &str) -> Option<&str> {
        self.get(&join_key("ConnectionStrings", name))
    }

    /// Returns every entry below `prefix`, with the prefix stripped from keys.
    pub fn section(&self, prefix: &str) -> ConfigMap {
        let needle = format!("{}{KEY_DELIMITER}", normalize_key(prefix));
        let depth = prefix.split(KEY_DELIMITER).count();
        let mut section = ConfigMap::new();
        for (normalized, entry) in self.entries.range(needle.clone()..) {
            if !normalized.starts_with(&needle) {
                break;
            }
            // Case folding can change a segment's length but never the
            // number of delimiters, so strip whole segments.
            let stripped = entry
                .key
                .splitn(depth + 1, KEY_DELIMITER)
                .nth(depth)
                .unwrap_or_default();
            if !stripped.is_empty() {
                section.insert(ConfigEntry::new(stripped, entry.value.clone()));
            }
        }
        section
    }

    /// Distinct immediate child segments below `prefix` (or at the root when
    /// `prefix` is empty), in key order.
    pub fn child_keys(&self, prefix: &str) -> Vec<String> {
        let scoped;
        let source = if prefix.is_empty() {
            self
        } else {
            scoped = self.section(prefix);
            &scoped
        };

        let mut children: BTreeMap<String, String> = BTreeMap::new();
        for entry in source.entries.values() {
            let head = entry.key.split(KEY_DELIMITER).next().unwrap_or_default();
            children
                .entry(normalize_key(head))
                .or_insert_with(|| head.to_string());
        }
        children.into_values().collect()
    }

    /// Iterates `(key, value)` pairs in key order, keys in their stored spelling.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|entry| (entry.key.as_str(), entry.value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<ConfigEntry> for ConfigMap {
    fn extend<I: IntoIterator<Item = ConfigEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.insert(entry);
        }
    }
}

impl FromIterator<ConfigEntry> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = ConfigEntry>>(iter: I) -> Self {
        let mut map = ConfigMap::new();
        map.extend(iter);
        map
    }
}

impl Serialize for ConfigMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
