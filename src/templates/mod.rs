//! Built-in site templates using Tera template engine
//!
//! The templates are embedded directly in the binary, so a site needs no
//! theme directory of its own.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::PostRecord;
use crate::helpers::{encode_path, format_date};

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // URLs and compiled post bodies go out verbatim; text fields are
        // escaped in the templates themselves
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("home.html", include_str!("site/home.html")),
            ("blog_index.html", include_str!("site/blog_index.html")),
            ("post.html", include_str!("site/post.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            ("redirect.html", include_str!("site/redirect.html")),
            // Partials
            (
                "partials/post_card.html",
                include_str!("site/partials/post_card.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> tera::Result<String> {
        self.tera.render(template_name, context)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub author: String,
    pub role: String,
    pub description: String,
    pub url: String,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            author: config.author.clone(),
            role: config.role.clone(),
            description: config.description.clone(),
            url: config.base_url().to_string(),
        }
    }
}

/// A post as listed on cards and shown in the post header
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub title: String,
    pub url: String,
    /// Long-form date in the post's locale
    pub date: String,
    pub iso_date: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub reading_time: u32,
}

impl From<&PostRecord> for PostCard {
    fn from(post: &PostRecord) -> Self {
        Self {
            title: post.title.clone(),
            url: encode_path(&post.url),
            date: format_date(post.date, post.locale),
            iso_date: post.iso_date(),
            summary: post.summary.clone(),
            tags: post.tags.clone(),
            reading_time: post.reading_time,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub url: String,
}

impl From<&PostRecord> for NavPost {
    fn from(post: &PostRecord) -> Self {
        Self {
            title: post.title.clone(),
            url: encode_path(&post.url),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NavData {
    pub home: String,
    pub blog: String,
}

/// Entry of the language switcher
#[derive(Debug, Clone, Serialize)]
pub struct LanguageLink {
    pub code: String,
    pub name: String,
    pub url: String,
    pub current: bool,
}

/// A technology badge; `label` is the localized category name
#[derive(Debug, Clone, Serialize)]
pub struct TechBadge {
    pub name: String,
    pub category: String,
    pub label: String,
}

/// A past role, read from the `cv.experience.roles` messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub role: String,
    pub company: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactLink {
    pub label: String,
    pub href: String,
    /// Opens in a new tab
    pub external: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagData {
    pub name: String,
    pub count: usize,
}
