//! Post schema: required fields, their types, and the derived slug and URL

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_yaml::Value;
use std::path::Path;

use super::error::ContentError;
use super::frontmatter::FrontMatter;
use super::post::{reading_time, PostBody, PostRecord};
use crate::i18n::Locale;

/// Validated front-matter of a post
#[derive(Debug, Clone, PartialEq)]
pub struct PostMeta {
    pub title: String,
    pub date: NaiveDate,
    pub summary: String,
    pub tags: Vec<String>,
    pub locale: Locale,
}

impl PostMeta {
    /// Attach the derived fields and the compiled body
    pub fn into_record(self, document: &str, body: PostBody) -> Result<PostRecord, ContentError> {
        let slug = derive_slug(document);
        check_slug(&slug)
            .map_err(|reason| ContentError::violation(document, "slug", reason))?;
        let url = derive_url(self.locale, &slug);
        Ok(PostRecord {
            title: self.title,
            date: self.date,
            summary: self.summary,
            tags: self.tags,
            locale: self.locale,
            slug,
            url,
            reading_time: reading_time(&body.raw),
            body,
            source: document.to_string(),
        })
    }
}

/// Validate the raw front-matter of `document` against the post schema
pub fn validate(fm: &FrontMatter, document: &str) -> Result<PostMeta, ContentError> {
    let title = required_string(fm, document, "title")?;
    if title.trim().is_empty() {
        return Err(ContentError::violation(document, "title", "must not be empty"));
    }

    let date = match fm.get("date") {
        None | Some(Value::Null) => return Err(missing(document, "date")),
        Some(Value::String(s)) => parse_date(s).ok_or_else(|| {
            ContentError::violation(document, "date", format!("`{}` is not an ISO date", s))
        })?,
        Some(other) => {
            return Err(ContentError::violation(
                document,
                "date",
                format!("expected an ISO date, found {}", kind(other)),
            ))
        }
    };

    let summary = required_string(fm, document, "summary")?;

    let tags = match fm.get("tags") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Sequence(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(tag) => Ok(tag.clone()),
                other => Err(ContentError::violation(
                    document,
                    "tags",
                    format!("item {} must be a string, found {}", i, kind(other)),
                )),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(ContentError::violation(
                document,
                "tags",
                format!("expected a list of strings, found {}", kind(other)),
            ))
        }
    };

    let lang = required_string(fm, document, "lang")?;
    let locale = lang
        .parse::<Locale>()
        .map_err(|e| ContentError::violation(document, "lang", e.to_string()))?;

    Ok(PostMeta {
        title,
        date,
        summary,
        tags,
        locale,
    })
}

/// Slug: the source filename with its extension stripped
pub fn derive_slug(document: &str) -> String {
    Path::new(document)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| document.to_string())
}

/// A slug becomes one URL path segment and one output directory
fn check_slug(slug: &str) -> Result<(), String> {
    if slug.is_empty() || slug == "." || slug == ".." {
        return Err(format!("`{}` is not a usable slug", slug));
    }
    let reserved = slug.chars().find(|&c| {
        matches!(c, '/' | '\\' | '#' | '?' | '%') || c.is_whitespace() || c.is_control()
    });
    match reserved {
        Some(c) => Err(format!("`{}` contains the reserved character {:?}", slug, c)),
        None => Ok(()),
    }
}

/// Public URL of a post
pub fn derive_url(locale: Locale, slug: &str) -> String {
    format!("/{}/blog/{}", locale, slug)
}

fn required_string(fm: &FrontMatter, document: &str, field: &str) -> Result<String, ContentError> {
    match fm.get(field) {
        None | Some(Value::Null) => Err(missing(document, field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ContentError::violation(
            document,
            field,
            format!("expected a string, found {}", kind(other)),
        )),
    }
}

fn missing(document: &str, field: &str) -> ContentError {
    ContentError::violation(document, field, "required field is missing")
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Calendar date from an ISO date or date-time
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .into_iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}
