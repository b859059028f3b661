//! Post record model

use chrono::NaiveDate;
use serde::Serialize;

use crate::i18n::Locale;

/// A validated blog post, immutable once the collection is built
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub title: String,

    /// Publication date
    pub date: NaiveDate,

    pub summary: String,

    pub tags: Vec<String>,

    pub locale: Locale,

    /// Source filename without its extension
    pub slug: String,

    /// Public path, `/{locale}/blog/{slug}`
    pub url: String,

    pub body: PostBody,

    /// Source path, relative to the content directory
    pub source: String,

    /// Estimated reading time in minutes
    pub reading_time: u32,
}

/// Raw and compiled post body
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostBody {
    /// Body text as authored, front-matter removed
    pub raw: String,
    /// Compiled HTML
    pub html: String,
}

impl PostRecord {
    /// Publication date as `YYYY-MM-DD`
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Reading time at 200 words per minute, never less than a minute
pub fn reading_time(raw: &str) -> u32 {
    let words = raw.split_whitespace().count() as u32;
    words.div_ceil(200).max(1)
}
