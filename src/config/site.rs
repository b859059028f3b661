//! Site configuration (_config.yml)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::i18n::Locale;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub author: String,
    pub role: String,
    pub description: String,
    pub url: String,
    /// Profile links, published as `sameAs` in the person schema
    pub social: Vec<String>,
    /// Downloadable CV offered by the home page hero
    pub cv: Option<String>,
    /// Technologies shown on the home page
    pub stack: Vec<TechItem>,

    // Directory
    pub content_dir: String,
    /// Glob, relative to `content_dir`, selecting the post documents
    pub posts_pattern: String,
    pub public_dir: String,
    pub static_dir: String,
    pub messages_dir: String,

    #[serde(default)]
    pub i18n: I18nConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub sitemap: SitemapConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            author: "John Doe".to_string(),
            role: "Software Engineer".to_string(),
            description: String::new(),
            url: "http://example.com".to_string(),
            social: Vec::new(),
            cv: None,
            stack: default_stack(),

            content_dir: "content".to_string(),
            posts_pattern: "posts/*.mdx".to_string(),
            public_dir: "public".to_string(),
            static_dir: "static".to_string(),
            messages_dir: "messages".to_string(),

            i18n: I18nConfig::default(),
            highlight: HighlightConfig::default(),
            sitemap: SitemapConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read {:?}", path))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the locale resolver cannot work with
    pub fn validate(&self) -> Result<()> {
        let i18n = &self.i18n;
        if i18n.locales.is_empty() {
            bail!("i18n.locales must list at least one locale");
        }
        if !i18n.locales.contains(&i18n.default_locale) {
            bail!(
                "i18n.default_locale `{}` is not one of i18n.locales {:?}",
                i18n.default_locale,
                i18n.locales
            );
        }
        for (i, locale) in i18n.locales.iter().enumerate() {
            if i18n.locales[..i].contains(locale) {
                bail!("i18n.locales lists `{}` more than once", locale);
            }
        }
        if self.posts_pattern.trim().is_empty() {
            bail!("posts_pattern must not be empty");
        }
        Ok(())
    }

    /// Site URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

/// One technology of the home page stack, grouped by category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechItem {
    pub name: String,
    /// Message key under `techStack.categories`, e.g. `frontend`
    pub category: String,
}

fn default_stack() -> Vec<TechItem> {
    [
        ("React", "frontend"),
        ("TypeScript", "frontend"),
        ("Next.js", "frontend"),
        ("Tailwind CSS", "frontend"),
        ("Node.js", "backend"),
        ("AWS", "cloud"),
    ]
    .into_iter()
    .map(|(name, category)| TechItem {
        name: name.to_string(),
        category: category.to_string(),
    })
    .collect()
}

/// How locale prefixes appear in URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefixStrategy {
    /// Every localized URL carries its locale as the first path segment
    #[default]
    Always,
}

/// Locale routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    pub locales: Vec<Locale>,
    pub default_locale: Locale,
    pub prefix: PrefixStrategy,
    /// Issue 308 instead of 307 when adding the default locale prefix
    pub permanent_redirect: bool,
    /// Path prefixes that are never locale-resolved
    pub passthrough: Vec<String>,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            locales: Locale::ALL.to_vec(),
            default_locale: Locale::En,
            prefix: PrefixStrategy::Always,
            permanent_redirect: false,
            passthrough: vec![
                "/static".to_string(),
                "/sitemap.xml".to_string(),
                "/robots.txt".to_string(),
                "/favicon.ico".to_string(),
                "/__livereload".to_string(),
            ],
        }
    }
}

impl I18nConfig {
    /// Whether a request path bypasses locale resolution
    pub fn is_passthrough(&self, path: &str) -> bool {
        self.passthrough.iter().any(|prefix| {
            let prefix = prefix.trim_end_matches('/');
            !prefix.is_empty()
                && (path == prefix
                    || path
                        .strip_prefix(prefix)
                        .is_some_and(|rest| rest.starts_with('/')))
        })
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Sitemap and robots.txt configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    pub enable: bool,
    pub robots: bool,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            enable: true,
            robots: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.posts_pattern, "posts/*.mdx");
        assert_eq!(config.i18n.locales, Locale::ALL.to_vec());
        assert_eq!(config.i18n.default_locale, Locale::En);
        assert!(!config.i18n.permanent_redirect);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Riccardo's corner
url: https://example.dev/
i18n:
  locales: [it, en]
  default_locale: it
  permanent_redirect: true
highlight:
  line_number: true
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Riccardo's corner");
        assert_eq!(config.base_url(), "https://example.dev");
        assert_eq!(config.i18n.locales, vec![Locale::It, Locale::En]);
        assert_eq!(config.i18n.default_locale, Locale::It);
        assert_eq!(config.i18n.prefix, PrefixStrategy::Always);
        assert!(config.i18n.permanent_redirect);
        // untouched sections keep their defaults
        assert_eq!(config.content_dir, "content");
        assert!(config.highlight.line_number);
        assert!(config.sitemap.enable);
        assert_eq!(config.stack.len(), 6);
        assert!(config.cv.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_home_sections() {
        let yaml = "cv: /static/cv.pdf
stack:
  - name: Rust
    category: backend
";
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.cv.as_deref(), Some("/static/cv.pdf"));
        assert_eq!(
            config.stack,
            vec![TechItem {
                name: "Rust".to_string(),
                category: "backend".to_string()
            }]
        );
    }

    #[test]
    fn test_default_locale_must_be_supported() {
        let yaml = "i18n:\n  locales: [it, es]\n  default_locale: en\n";
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_locale"));
    }

    #[test]
    fn test_unknown_locale_is_rejected_at_parse_time() {
        let yaml = "i18n:\n  locales: [en, fr]\n";
        assert!(serde_yaml::from_str::<SiteConfig>(yaml).is_err());
    }

    #[test]
    fn test_load_reports_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "i18n: [not, a, mapping]\n").unwrap();
        let err = SiteConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("_config.yml"));
    }

    #[test]
    fn test_passthrough_matches_whole_segments() {
        let i18n = I18nConfig::default();
        assert!(i18n.is_passthrough("/static"));
        assert!(i18n.is_passthrough("/static/css/site.css"));
        assert!(i18n.is_passthrough("/sitemap.xml"));
        assert!(!i18n.is_passthrough("/staticky"));
        assert!(!i18n.is_passthrough("/en/blog"));
        assert!(!i18n.is_passthrough("/"));
    }
}
