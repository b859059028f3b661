//! Content build errors
//!
//! Every variant is fatal to the collection build: a broken document is
//! reported to its author instead of silently dropping the post.

use std::path::PathBuf;

use crate::i18n::Locale;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// A required front-matter field is missing or has the wrong type
    #[error("{document}: invalid field `{field}`: {reason}")]
    SchemaViolation {
        document: String,
        field: String,
        reason: String,
    },

    /// The front-matter block or the body cannot be compiled
    #[error("{document}: {reason}")]
    ParseFailure { document: String, reason: String },

    /// Two documents derive the same `(locale, slug)` pair
    #[error("duplicate slug `{slug}` for locale `{locale}` in {first} and {second}")]
    DuplicateSlug {
        locale: Locale,
        slug: String,
        first: String,
        second: String,
    },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid content pattern `{pattern}`: {reason}")]
    Pattern { pattern: String, reason: String },
}

impl ContentError {
    pub(crate) fn violation(document: &str, field: &str, reason: impl Into<String>) -> Self {
        ContentError::SchemaViolation {
            document: document.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn parse_failure(document: &str, reason: impl Into<String>) -> Self {
        ContentError::ParseFailure {
            document: document.to_string(),
            reason: reason.into(),
        }
    }

    /// Source document the error refers to, when there is a single one
    pub fn document(&self) -> Option<&str> {
        match self {
            ContentError::SchemaViolation { document, .. }
            | ContentError::ParseFailure { document, .. } => Some(document),
            ContentError::DuplicateSlug { second, .. } => Some(second),
            ContentError::Io { .. } | ContentError::Pattern { .. } => None,
        }
    }
}
