//! Content collector - turns the post documents under the content directory
//! into a validated collection

use std::fs;
use std::path::{Path, PathBuf};

use super::{
    schema, Collection, ContentError, FrontMatter, MarkdownRenderer, PostBody, PostRecord,
};
use crate::Folio;

/// Collects posts from the content directory
pub struct ContentCollector<'a> {
    folio: &'a Folio,
    renderer: MarkdownRenderer,
}

impl<'a> ContentCollector<'a> {
    pub fn new(folio: &'a Folio) -> Self {
        let highlight = &folio.config.highlight;
        let renderer = MarkdownRenderer::with_options(&highlight.theme, highlight.line_number);
        Self { folio, renderer }
    }

    /// Build the collection from every document matching the posts pattern
    ///
    /// Documents are processed in path order and the first broken one
    /// aborts the build.
    pub fn collect(&self) -> Result<Collection, ContentError> {
        let content_dir = &self.folio.content_dir;
        if !content_dir.is_dir() {
            tracing::warn!("Content directory {:?} does not exist, no posts", content_dir);
            return Ok(Collection::empty());
        }

        let paths = self.matching_paths()?;
        if paths.is_empty() {
            tracing::warn!(
                "No documents match {:?} in {:?}",
                self.folio.config.posts_pattern,
                content_dir
            );
        }

        let mut posts = Vec::with_capacity(paths.len());
        for path in paths {
            let content = fs::read_to_string(&path).map_err(|source| ContentError::Io {
                path: path.clone(),
                source,
            })?;
            let document = self.document_name(&path);
            let post = self.parse_document(&document, &content)?;
            tracing::debug!("Collected {} as {}", document, post.url);
            posts.push(post);
        }

        let collection = Collection::new(posts)?;
        tracing::info!("Collected {} posts", collection.len());
        Ok(collection)
    }

    /// Validate and compile one document
    pub fn parse_document(&self, document: &str, content: &str) -> Result<PostRecord, ContentError> {
        let (fm, body) = FrontMatter::parse(content)
            .map_err(|e| ContentError::parse_failure(document, e.to_string()))?;

        let meta = schema::validate(&fm, document)?;

        let html = self
            .renderer
            .render(body)
            .map_err(|e| ContentError::parse_failure(document, e.to_string()))?;

        let body = PostBody {
            raw: body.to_string(),
            html,
        };
        meta.into_record(document, body)
    }

    fn matching_paths(&self) -> Result<Vec<PathBuf>, ContentError> {
        let pattern = format!(
            "{}/{}",
            glob::Pattern::escape(&self.folio.content_dir.to_string_lossy()),
            self.folio.config.posts_pattern.trim_start_matches('/')
        );

        let entries = glob::glob(&pattern).map_err(|e| ContentError::Pattern {
            pattern: self.folio.config.posts_pattern.clone(),
            reason: e.to_string(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                ContentError::Io {
                    path,
                    source: e.into(),
                }
            })?;
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Path relative to the content directory, with `/` separators
    fn document_name(&self, path: &Path) -> String {
        path.strip_prefix(&self.folio.content_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}
