use serde::{Deserialize, Serialize};

/// Options for the configuration resolver itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Suppresses the progress lines written while resolving. Has no effect
    /// on what gets merged.
    pub logging_disabled: bool,
}

impl Settings {
    /// Settings with diagnostic output turned off.
    pub const fn quiet() -> Self {
        Self {
            logging_disabled: true,
        }
    }
}
