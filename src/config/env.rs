use super::source::{join_key, ConfigEntry, ConfigSource, KEY_DELIMITER};
use super::ConfigError;

/// Separator used in variable names in place of the key delimiter.
const NESTING_SEPARATOR: &str = "__";

/// Variable-name prefixes that carry database connection strings, with the
/// invariant provider name recorded next to them (`None` for custom
/// connections).
const CONNECTION_STRING_PREFIXES: &[(&str, Option<&str>)] = &[
    ("MYSQLCONNSTR_", Some("MySql.Data.MySqlClient")),
    ("SQLAZURECONNSTR_", Some("System.Data.SqlClient")),
    ("SQLCONNSTR_", Some("System.Data.SqlClient")),
    ("POSTGRESQLCONNSTR_", Some("Npgsql")),
    ("CUSTOMCONNSTR_", None),
];

/// Where environment variables are read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EnvVars {
    /// The live process environment, read on every access.
    #[default]
    Process,
    /// A fixed snapshot, in the given order.
    Fixed(Vec<(String, String)>),
}

impl EnvVars {
    pub fn fixed<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Fixed(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// All variables. Process variables that are not valid Unicode are skipped.
    pub fn vars(&self) -> Vec<(String, String)> {
        match self {
            Self::Process => std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
            Self::Fixed(vars) => vars.clone(),
        }
    }

    /// Looks up a single variable by its exact name.
    pub fn get(&self, name: &str) -> Option<String> {
        match self {
            Self::Process => std::env::var(name).ok(),
            Self::Fixed(vars) => vars
                .iter()
                .rev()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone()),
        }
    }
}

/// Configuration layer built from environment variables.
///
/// `__` in a variable name becomes the `:` key delimiter, so
/// `Logging__LogLevel` sets `Logging:LogLevel`. Connection-string variables
/// such as `SQLCONNSTR_Main` are exposed as `ConnectionStrings:Main`.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: EnvVars,
    prefix: Option<String>,
}

impl EnvSource {
    pub fn new(vars: EnvVars) -> Self {
        Self { vars, prefix: None }
    }

    /// Keeps only variables starting with `prefix` (case-insensitive) and
    /// strips it from the resulting keys.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    fn strip_prefix<'a>(&self, name: &'a str) -> Option<&'a str> {
        match &self.prefix {
            None => Some(name),
            Some(prefix) => strip_prefix_ignore_case(name, prefix),
        }
    }
}

impl ConfigSource for EnvSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        let mut entries = Vec::new();

        for (name, value) in self.vars.vars() {
            if let Some((rest, provider)) = split_connection_string(&name) {
                let Some(conn_name) = self.strip_prefix(rest) else {
                    continue;
                };
                if conn_name.is_empty() {
                    continue;
                }
                let conn_name = conn_name.replace(NESTING_SEPARATOR, KEY_DELIMITER);
                let key = join_key("ConnectionStrings", &conn_name);
                if let Some(provider) = provider {
                    entries.push(ConfigEntry::new(format!("{key}_ProviderName"), provider));
                }
                entries.push(ConfigEntry::new(key, value));
                continue;
            }

            let Some(key) = self.strip_prefix(&name) else {
                continue;
            };
            if key.is_empty() {
                continue;
            }
            entries.push(ConfigEntry::new(
                key.replace(NESTING_SEPARATOR, KEY_DELIMITER),
                value,
            ));
        }

        Ok(entries)
    }

    fn name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("environment variables ({prefix}*)"),
            None => "environment variables".to_string(),
        }
    }
}

fn split_connection_string(name: &str) -> Option<(&str, Option<&'static str>)> {
    CONNECTION_STRING_PREFIXES
        .iter()
        .find_map(|(prefix, provider)| {
            strip_prefix_ignore_case(name, prefix).map(|rest| (rest, *provider))
        })
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}
