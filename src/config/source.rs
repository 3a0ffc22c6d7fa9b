use super::ConfigError;

/// Separator between the segments of a hierarchical configuration key.
pub const KEY_DELIMITER: &str = ":";

/// One flattened key/value pair produced by a configuration source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}

impl ConfigEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A layer in the configuration merge.
///
/// Sources return their entries in source order; when a source yields the same
/// key twice, the later entry wins.
pub trait ConfigSource: Send + Sync + std::fmt::Debug {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError>;

    /// Short label used in log output.
    fn name(&self) -> String;
}

/// Folds a key to the form used for case-insensitive comparison.
pub(crate) fn normalize_key(key: &str) -> String {
    key.to_lowercase()
}

pub(crate) fn join_key(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}{KEY_DELIMITER}{segment}")
    }
}
