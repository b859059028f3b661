//! The frozen post collection and the store that publishes it

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::error::ContentError;
use super::post::PostRecord;
use crate::i18n::Locale;

/// Every validated post of one build, in collection order
#[derive(Debug)]
pub struct Collection {
    posts: Vec<PostRecord>,
    index: HashMap<(Locale, String), usize>,
}

impl Collection {
    /// Freeze a set of records; `(locale, slug)` pairs must be unique
    pub fn new(posts: Vec<PostRecord>) -> Result<Self, ContentError> {
        let mut index = HashMap::with_capacity(posts.len());

        for (i, post) in posts.iter().enumerate() {
            let key = (post.locale, post.slug.clone());
            if let Some(&first) = index.get(&key) {
                let first: &PostRecord = &posts[first];
                return Err(ContentError::DuplicateSlug {
                    locale: post.locale,
                    slug: post.slug.clone(),
                    first: first.source.clone(),
                    second: post.source.clone(),
                });
            }
            index.insert(key, i);
        }

        Ok(Self { posts, index })
    }

    pub fn empty() -> Self {
        Self {
            posts: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// All records, unfiltered, in collection order
    pub fn posts(&self) -> &[PostRecord] {
        &self.posts
    }

    pub fn get(&self, locale: Locale, slug: &str) -> Option<&PostRecord> {
        self.index
            .get(&(locale, slug.to_string()))
            .map(|&i| &self.posts[i])
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// Holds the live collection; rebuilds swap it as a whole
#[derive(Debug)]
pub struct ContentStore {
    current: RwLock<Arc<Collection>>,
}

impl ContentStore {
    pub fn new(collection: Collection) -> Self {
        Self {
            current: RwLock::new(Arc::new(collection)),
        }
    }

    /// The collection as of now; unaffected by later swaps
    pub fn snapshot(&self) -> Arc<Collection> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Publish a new collection, returning the one it replaces
    pub fn replace(&self, collection: Collection) -> Arc<Collection> {
        let next = Arc::new(collection);
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PostBody;
    use chrono::NaiveDate;

    fn post(locale: Locale, slug: &str, day: u32) -> PostRecord {
        PostRecord {
            title: slug.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            summary: String::new(),
            tags: Vec::new(),
            locale,
            slug: slug.to_string(),
            url: format!("/{}/blog/{}", locale, slug),
            body: PostBody::default(),
            source: format!("{}.mdx", slug),
            reading_time: 1,
        }
    }

    #[test]
    fn test_lookup_by_locale_and_slug() {
        let collection = Collection::new(vec![
            post(Locale::En, "hello", 1),
            post(Locale::It, "hello", 2),
        ])
        .unwrap();

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get(Locale::It, "hello").unwrap().date.to_string(), "2024-01-02");
        assert!(collection.get(Locale::Es, "hello").is_none());
    }

    #[test]
    fn test_duplicate_slug_within_locale_is_rejected() {
        let mut second = post(Locale::En, "hello", 2);
        second.source = "nested/hello.mdx".to_string();
        let err = Collection::new(vec![post(Locale::En, "hello", 1), second]).unwrap_err();
        match err {
            ContentError::DuplicateSlug {
                first, second, ..
            } => {
                assert_eq!(first, "hello.mdx");
                assert_eq!(second, "nested/hello.mdx");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let store = ContentStore::new(Collection::new(vec![post(Locale::En, "old", 1)]).unwrap());
        let before = store.snapshot();

        let previous = store.replace(Collection::new(vec![post(Locale::En, "new", 2)]).unwrap());

        assert!(Arc::ptr_eq(&before, &previous));
        assert!(before.get(Locale::En, "old").is_some());
        assert!(before.get(Locale::En, "new").is_none());

        let after = store.snapshot();
        assert!(after.get(Locale::En, "new").is_some());
        assert!(after.get(Locale::En, "old").is_none());
    }

    #[tokio::test]
    async fn test_concurrent_readers_see_whole_collections() {
        let store = Arc::new(ContentStore::new(Collection::empty()));

        let readers: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    for _ in 0..200 {
                        let snapshot = store.snapshot();
                        // every published collection holds either zero or three posts
                        assert!(snapshot.len() == 0 || snapshot.len() == 3);
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        for round in 0..50 {
            let posts = if round % 2 == 0 {
                vec![
                    post(Locale::En, "a", 1),
                    post(Locale::En, "b", 2),
                    post(Locale::En, "c", 3),
                ]
            } else {
                Vec::new()
            };
            store.replace(Collection::new(posts).unwrap());
            tokio::task::yield_now().await;
        }

        for reader in readers {
            reader.await.unwrap();
        }
    }
}
