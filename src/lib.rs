//! folio: a localized portfolio and blog engine
//!
//! Posts are MDX documents with YAML front-matter. They are validated into
//! an immutable collection, queried per locale and served under
//! locale-prefixed URLs, either as a static site or from a dev server.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod pages;
pub mod query;
pub mod seo;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The main folio application
#[derive(Debug, Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content directory, holding the post documents
    pub content_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static assets, served under `/static`
    pub static_dir: PathBuf,
    /// UI message catalogs
    pub messages_dir: PathBuf,
}

impl Folio {
    /// Create a new folio instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let messages_dir = base_dir.join(&config.messages_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
            public_dir,
            static_dir,
            messages_dir,
        })
    }

    /// Build the post collection
    pub fn collect(&self) -> Result<content::Collection> {
        Ok(content::ContentCollector::new(self).collect()?)
    }

    /// Built-in messages overlaid with the site's message files
    pub fn load_messages(&self) -> Result<i18n::Messages> {
        let mut messages = i18n::Messages::builtin(self.config.i18n.default_locale);
        messages.load_dir(&self.messages_dir)?;
        Ok(messages)
    }

    /// Generate the static site
    pub fn build(&self, clean: bool) -> Result<()> {
        commands::build::run(self, clean)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
