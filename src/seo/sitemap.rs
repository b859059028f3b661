//! sitemap.xml and robots.txt

use chrono::NaiveDate;

use crate::config::SiteConfig;
use crate::content::Collection;
use crate::helpers::{date_xml, escape_xml, full_url_for};
use crate::i18n::{Locale, LocaleResolver};
use crate::query::PostQuery;

struct Entry {
    loc: String,
    lastmod: Option<NaiveDate>,
    changefreq: &'static str,
    priority: &'static str,
    alternates: Vec<(Locale, String)>,
}

/// One entry per locale and route: home, blog index and every post of that
/// locale. Alternates link the same route in the other locales.
pub fn render_sitemap(
    config: &SiteConfig,
    resolver: &LocaleResolver,
    collection: &Collection,
) -> String {
    let query = PostQuery::new(collection);
    let mut entries = Vec::new();

    for &locale in resolver.locales() {
        let posts = query.list_by_locale(locale);
        let latest = posts.first().map(|p| p.date);

        for (route, changefreq, priority) in [("/", "monthly", "1.0"), ("/blog", "weekly", "0.8")] {
            entries.push(Entry {
                loc: full_url_for(config, &resolver.localize(locale, route)),
                lastmod: latest,
                changefreq,
                priority,
                alternates: alternates(config, resolver, route, resolver.locales()),
            });
        }

        for post in posts {
            let route = format!("/blog/{}", post.slug);
            let translated: Vec<Locale> = resolver
                .locales()
                .iter()
                .copied()
                .filter(|&l| collection.get(l, &post.slug).is_some())
                .collect();
            entries.push(Entry {
                loc: full_url_for(config, &post.url),
                lastmod: Some(post.date),
                changefreq: "yearly",
                priority: "0.6",
                alternates: alternates(config, resolver, &route, &translated),
            });
        }
    }

    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:xhtml="http://www.w3.org/1999/xhtml">"#);
    xml.push('\n');

    for entry in &entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
        if let Some(date) = entry.lastmod {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", date_xml(date)));
        }
        xml.push_str(&format!("    <changefreq>{}</changefreq>\n", entry.changefreq));
        xml.push_str(&format!("    <priority>{}</priority>\n", entry.priority));
        // a lone self-reference carries no information
        if entry.alternates.len() > 1 {
            for (locale, href) in &entry.alternates {
                xml.push_str(&format!(
                    "    <xhtml:link rel=\"alternate\" hreflang=\"{}\" href=\"{}\"/>\n",
                    locale,
                    escape_xml(href)
                ));
            }
        }
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

fn alternates(
    config: &SiteConfig,
    resolver: &LocaleResolver,
    route: &str,
    locales: &[Locale],
) -> Vec<(Locale, String)> {
    locales
        .iter()
        .map(|&l| (l, full_url_for(config, &resolver.localize(l, route))))
        .collect()
}

/// robots.txt allowing every crawler, pointing at the sitemap when enabled
pub fn render_robots(config: &SiteConfig) -> String {
    let mut robots = String::from("User-agent: *\nAllow: /\n");
    if config.sitemap.enable {
        robots.push_str(&format!(
            "\nSitemap: {}\n",
            full_url_for(config, "/sitemap.xml")
        ));
    }
    robots
}
