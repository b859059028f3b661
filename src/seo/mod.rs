//! Search-engine metadata: page meta tags, JSON-LD, sitemap and robots.txt

mod sitemap;

pub use sitemap::{render_robots, render_sitemap};

use serde::Serialize;
use serde_json::{json, Value};

use crate::config::SiteConfig;
use crate::content::PostRecord;
use crate::helpers::full_url_for;
use crate::i18n::{Locale, LocaleResolver};

/// `hreflang` link to the same route in another locale
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alternate {
    pub hreflang: String,
    pub href: String,
}

/// Head metadata of one rendered page
#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    /// Page title with the site name appended
    pub title: String,
    pub description: String,
    pub canonical: String,
    pub locale: Locale,
    /// Open Graph type, `website` or `article`
    pub kind: &'static str,
    pub alternates: Vec<Alternate>,
    pub published: Option<String>,
    pub keywords: Vec<String>,
}

impl PageMeta {
    /// Metadata for `route` under `locale`; `title` defaults to the site title
    pub fn new(
        config: &SiteConfig,
        resolver: &LocaleResolver,
        locale: Locale,
        route: &str,
        title: Option<&str>,
        description: &str,
    ) -> Self {
        let title = match title {
            Some(title) => full_title(title, &config.title),
            None => config.title.clone(),
        };

        let mut alternates: Vec<Alternate> = resolver
            .locales()
            .iter()
            .map(|&l| Alternate {
                hreflang: l.code().to_string(),
                href: full_url_for(config, &resolver.localize(l, route)),
            })
            .collect();
        alternates.push(Alternate {
            hreflang: "x-default".to_string(),
            href: full_url_for(config, &resolver.localize(resolver.default_locale(), route)),
        });

        Self {
            title,
            description: description.to_string(),
            canonical: full_url_for(config, &resolver.localize(locale, route)),
            locale,
            kind: "website",
            alternates,
            published: None,
            keywords: Vec::new(),
        }
    }

    /// Article metadata; alternates are limited to locales that carry the post
    pub fn article(mut self, post: &PostRecord, translated: &[Locale]) -> Self {
        self.kind = "article";
        self.published = Some(post.iso_date());
        self.keywords = post.tags.clone();
        self.alternates
            .retain(|alt| Locale::from_code(&alt.hreflang).map_or(true, |l| translated.contains(&l)));

        // x-default only survives if it points at a kept translation
        let localized: Vec<String> = self
            .alternates
            .iter()
            .filter(|alt| alt.hreflang != "x-default")
            .map(|alt| alt.href.clone())
            .collect();
        self.alternates
            .retain(|alt| alt.hreflang != "x-default" || localized.contains(&alt.href));
        self
    }
}

/// `"{title} | {site}"`, unless the title already names the site
pub fn full_title(title: &str, site_name: &str) -> String {
    if site_name.is_empty() || title.contains(site_name) {
        title.to_string()
    } else {
        format!("{} | {}", title, site_name)
    }
}

/// schema.org `Person` describing the site author
pub fn person_schema(config: &SiteConfig) -> Value {
    json!({
        "@context": "https://schema.org",
        "@type": "Person",
        "name": config.author,
        "jobTitle": config.role,
        "description": config.description,
        "url": config.base_url(),
        "sameAs": config.social,
    })
}

/// schema.org `BlogPosting` for a post
pub fn blog_post_schema(config: &SiteConfig, post: &PostRecord) -> Value {
    let author = json!({
        "@type": "Person",
        "name": config.author,
        "url": config.base_url(),
    });

    json!({
        "@context": "https://schema.org",
        "@type": "BlogPosting",
        "headline": post.title,
        "description": post.summary,
        "url": full_url_for(config, &post.url),
        "datePublished": post.iso_date(),
        "inLanguage": post.locale.code(),
        "keywords": post.tags,
        "author": author,
        "publisher": author,
    })
}

/// Serialize a JSON-LD value for embedding in a `<script>` element
pub fn json_ld(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PostBody;
    use chrono::NaiveDate;

    fn config() -> SiteConfig {
        SiteConfig {
            title: "Riccardo".to_string(),
            author: "Riccardo".to_string(),
            role: "Frontend Engineer".to_string(),
            url: "https://example.dev".to_string(),
            social: vec!["https://github.com/someone".to_string()],
            ..SiteConfig::default()
        }
    }

    fn post() -> PostRecord {
        PostRecord {
            title: "Calm and fast".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            summary: "A mindset".to_string(),
            tags: vec!["react".to_string()],
            locale: Locale::It,
            slug: "calm".to_string(),
            url: "/it/blog/calm".to_string(),
            body: PostBody::default(),
            source: "posts/calm.mdx".to_string(),
            reading_time: 3,
        }
    }

    #[test]
    fn test_full_title() {
        assert_eq!(full_title("Blog", "Riccardo"), "Blog | Riccardo");
        assert_eq!(full_title("Riccardo - Home", "Riccardo"), "Riccardo - Home");
    }

    #[test]
    fn test_page_meta_alternates() {
        let config = config();
        let resolver = LocaleResolver::new(&config.i18n);
        let meta = PageMeta::new(&config, &resolver, Locale::Es, "/blog", Some("Blog"), "desc");

        assert_eq!(meta.title, "Blog | Riccardo");
        assert_eq!(meta.canonical, "https://example.dev/es/blog");
        let hreflangs: Vec<&str> = meta.alternates.iter().map(|a| a.hreflang.as_str()).collect();
        assert_eq!(hreflangs, vec!["en", "it", "es", "x-default"]);
        assert_eq!(meta.alternates[1].href, "https://example.dev/it/blog");
        assert_eq!(meta.alternates[3].href, "https://example.dev/en/blog");
    }

    #[test]
    fn test_article_meta_keeps_translated_locales() {
        let config = config();
        let resolver = LocaleResolver::new(&config.i18n);
        let post = post();
        let meta = PageMeta::new(&config, &resolver, Locale::It, "/blog/calm", Some(&post.title), &post.summary)
            .article(&post, &[Locale::It, Locale::En]);

        assert_eq!(meta.kind, "article");
        assert_eq!(meta.published.as_deref(), Some("2024-01-15"));
        let hreflangs: Vec<&str> = meta.alternates.iter().map(|a| a.hreflang.as_str()).collect();
        assert_eq!(hreflangs, vec!["en", "it", "x-default"]);
    }

    #[test]
    fn test_schemas() {
        let config = config();
        let person = person_schema(&config);
        assert_eq!(person["@type"], "Person");
        assert_eq!(person["jobTitle"], "Frontend Engineer");
        assert_eq!(person["sameAs"][0], "https://github.com/someone");

        let posting = blog_post_schema(&config, &post());
        assert_eq!(posting["@type"], "BlogPosting");
        assert_eq!(posting["headline"], "Calm and fast");
        assert_eq!(posting["url"], "https://example.dev/it/blog/calm");
        assert_eq!(posting["datePublished"], "2024-01-15");
        assert_eq!(posting["author"]["name"], "Riccardo");
    }

    #[test]
    fn test_json_ld_cannot_close_script() {
        let value = json!({ "headline": "</script><b>" });
        assert!(!json_ld(&value).contains("</script>"));
    }
}
