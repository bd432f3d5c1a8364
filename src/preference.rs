//! Theme preference and resolved theme values.
//!
//! DESIGN
//! ======
//! `Preference` is what the user asked for; `ResolvedTheme` is what the
//! document actually shows. Only `Preference` is ever stored. Both serialize
//! as their lowercase names, which is also the persisted and attribute form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "preference_test.rs"]
mod preference_test;

/// Error returned when a string is not a known [`Preference`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme preference: {0:?} (expected light, dark or system)")]
pub struct ParsePreferenceError(pub String);

/// Error returned when a string is not a known [`ResolvedTheme`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme: {0:?} (expected light or dark)")]
pub struct ParseThemeError(pub String);

/// The user's explicit theme choice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    Light,
    Dark,
    /// Follow the environment's reported color scheme.
    #[default]
    System,
}

impl Preference {
    /// All preference values, in menu order.
    pub const ALL: [Preference; 3] = [Self::Light, Self::Dark, Self::System];

    /// Persisted string form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    /// Resolve against the environment's current color scheme.
    #[must_use]
    pub fn resolve(self, system: ResolvedTheme) -> ResolvedTheme {
        match self {
            Self::Light => ResolvedTheme::Light,
            Self::Dark => ResolvedTheme::Dark,
            Self::System => system,
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preference {
    type Err = ParsePreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(ParsePreferenceError(other.to_owned())),
        }
    }
}

impl From<ResolvedTheme> for Preference {
    fn from(theme: ResolvedTheme) -> Self {
        match theme {
            ResolvedTheme::Light => Self::Light,
            ResolvedTheme::Dark => Self::Dark,
        }
    }
}

/// A concrete theme applied to the document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTheme {
    #[default]
    Light,
    Dark,
}

impl ResolvedTheme {
    /// Attribute string form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Map a "prefers dark" media-query match to a theme.
    #[must_use]
    pub fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark { Self::Dark } else { Self::Light }
    }
}

impl fmt::Display for ResolvedTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolvedTheme {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(ParseThemeError(other.to_owned())),
        }
    }
}
