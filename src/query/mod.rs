//! Read-only queries over a built collection

use std::collections::HashMap;

use crate::content::{Collection, PostRecord};
use crate::i18n::Locale;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("no post `{slug}` in locale `{locale}`")]
    NotFound { locale: Locale, slug: String },
}

/// Neighbours of a post in its locale's newest-first listing
#[derive(Debug, Clone, Copy, Default)]
pub struct Adjacent<'a> {
    /// The next older post
    pub previous: Option<&'a PostRecord>,
    /// The next newer post
    pub next: Option<&'a PostRecord>,
}

/// Queries borrow the collection they were built from, so a swap of the
/// live collection never changes an answer mid-request.
#[derive(Debug, Clone, Copy)]
pub struct PostQuery<'a> {
    collection: &'a Collection,
}

impl<'a> PostQuery<'a> {
    pub fn new(collection: &'a Collection) -> Self {
        Self { collection }
    }

    /// Posts of `locale`, newest first; equal dates keep collection order
    pub fn list_by_locale(&self, locale: Locale) -> Vec<&'a PostRecord> {
        let mut posts: Vec<&PostRecord> = self
            .collection
            .posts()
            .iter()
            .filter(|p| p.locale == locale)
            .collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        posts
    }

    pub fn get_by_slug(&self, locale: Locale, slug: &str) -> Result<&'a PostRecord, QueryError> {
        self.collection
            .get(locale, slug)
            .ok_or_else(|| QueryError::NotFound {
                locale,
                slug: slug.to_string(),
            })
    }

    pub fn get_adjacent(&self, locale: Locale, slug: &str) -> Result<Adjacent<'a>, QueryError> {
        let posts = self.list_by_locale(locale);
        let index = posts
            .iter()
            .position(|p| p.slug == slug)
            .ok_or_else(|| QueryError::NotFound {
                locale,
                slug: slug.to_string(),
            })?;

        Ok(Adjacent {
            previous: posts.get(index + 1).copied(),
            next: index.checked_sub(1).and_then(|i| posts.get(i).copied()),
        })
    }

    /// Tags used in `locale` with their post counts, most used first
    pub fn tags(&self, locale: Locale) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for post in self.collection.posts().iter().filter(|p| p.locale == locale) {
            for tag in &post.tags {
                *counts.entry(tag.as_str()).or_insert(0) += 1;
            }
        }

        let mut tags: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(tag, count)| (tag.to_string(), count))
            .collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        tags
    }
}
