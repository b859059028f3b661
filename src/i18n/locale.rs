//! Supported locales

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported site locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    It,
    Es,
}

/// Returned when a string is not one of the locale codes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale `{0}` (expected one of: en, it, es)")]
pub struct UnknownLocale(pub String);

impl Locale {
    /// Every locale known to the engine, in declaration order
    pub const ALL: [Locale; 3] = [Locale::En, Locale::It, Locale::Es];

    /// Lowercase code used in URLs and front-matter
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::It => "it",
            Locale::Es => "es",
        }
    }

    /// Native display name, used by the language switcher
    pub fn native_name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::It => "Italiano",
            Locale::Es => "Español",
        }
    }

    /// Exact, case-sensitive match against the locale codes.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.code() == code)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnknownLocale(s.to_string()))
    }
}
