//! Storage key, document attribute and media query used by the controller.

use serde::Deserialize;

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_STORAGE_KEY: &str = "hashprep-theme";
pub const DEFAULT_ATTRIBUTE: &str = "data-theme";
pub const DEFAULT_MEDIA_QUERY: &str = "(prefers-color-scheme: dark)";

/// Names the controller uses when talking to its platform.
///
/// Missing fields fall back to the defaults above, so a partial JSON
/// document such as `{"storage_key": "x"}` is a valid config.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Persistent storage key holding the preference string.
    pub storage_key: String,
    /// Attribute set on the document root element.
    pub attribute: String,
    /// Media query whose match means the environment prefers dark.
    pub media_query: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            attribute: DEFAULT_ATTRIBUTE.to_owned(),
            media_query: DEFAULT_MEDIA_QUERY.to_owned(),
        }
    }
}

impl ThemeConfig {
    /// Parse a config from JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] for malformed JSON or
    /// fields of the wrong type.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Replace the storage key.
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}
