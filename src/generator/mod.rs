//! Generator module - writes the static site for a built collection

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::content::Collection;
use crate::helpers::output_path;
use crate::pages::PageRenderer;
use crate::query::PostQuery;
use crate::seo;
use crate::Folio;

/// Static site generator using the built-in templates
pub struct Generator {
    folio: Folio,
    pages: PageRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(folio: &Folio) -> Result<Self> {
        let messages = folio.load_messages()?;
        let pages = PageRenderer::new(&folio.config, messages)?;

        Ok(Self {
            folio: folio.clone(),
            pages,
        })
    }

    /// Generate the entire site, returning the number of pages written
    pub fn generate(&self, collection: &Collection) -> Result<usize> {
        fs::create_dir_all(&self.folio.public_dir)
            .with_context(|| format!("failed to create {:?}", self.folio.public_dir))?;

        self.copy_static_assets()?;

        let resolver = self.pages.resolver();
        let query = PostQuery::new(collection);
        let mut count = 0;

        for &locale in resolver.locales() {
            let home = self.pages.render_home(collection, locale)?;
            self.write(&output_path(&resolver.localize(locale, "/")), &home)?;

            let blog = self.pages.render_blog_index(collection, locale)?;
            self.write(&output_path(&resolver.localize(locale, "/blog")), &blog)?;
            count += 2;

            for post in query.list_by_locale(locale) {
                let html = self.pages.render_post(collection, locale, &post.slug)?;
                self.write(&output_path(&post.url), &html)?;
                count += 1;
            }
        }

        // The root path has no locale; point it at the default one
        let root = self
            .pages
            .render_redirect(&resolver.localize(resolver.default_locale(), "/"))?;
        self.write("index.html", &root)?;

        let not_found = self.pages.render_not_found(resolver.default_locale())?;
        self.write("404.html", &not_found)?;
        count += 2;

        if self.folio.config.sitemap.enable {
            let sitemap = seo::render_sitemap(&self.folio.config, resolver, collection);
            self.write("sitemap.xml", &sitemap)?;
        }
        if self.folio.config.sitemap.robots {
            self.write("robots.txt", &seo::render_robots(&self.folio.config))?;
        }

        tracing::info!("Generated {} pages", count);
        Ok(count)
    }

    fn write(&self, relative: &str, content: &str) -> Result<()> {
        let output_path = self.folio.public_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create dir {:?}", parent))?;
        }
        fs::write(&output_path, content)
            .with_context(|| format!("failed to write {:?}", output_path))?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Copy the static directory to `public/static`
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.folio.static_dir;
        if !static_dir.is_dir() {
            return Ok(());
        }
        let dest_root = self.folio.public_dir.join("static");

        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = dest_root.join(relative);
            copy_file(path, &dest)?;
        }

        Ok(())
    }
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to).with_context(|| format!("failed to copy {:?} to {:?}", from, to))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, relative: &str, content: &str) {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn doc(title: &str, date: &str, lang: &str) -> String {
        format!(
            "---\ntitle: {}\ndate: {}\nsummary: About {}\nlang: {}\n---\n\nBody.\n",
            title, date, title, lang
        )
    }

    #[test]
    fn test_generate_site() {
        let dir = TempDir::new().unwrap();
        write(&dir, "content/posts/hello.mdx", &doc("Hello", "2024-01-15", "en"));
        write(&dir, "content/posts/ciao.mdx", &doc("Ciao", "2024-01-10", "it"));
        write(&dir, "static/css/site.css", "body {}");
        write(&dir, "messages/it.yml", "nav:\n  blog: Diario\n");

        let folio = Folio::new(dir.path()).unwrap();
        let collection = folio.collect().unwrap();
        let count = Generator::new(&folio).unwrap().generate(&collection).unwrap();

        // 3 locales x (home + blog), 2 posts, root redirect and 404
        assert_eq!(count, 10);

        let public = dir.path().join("public");
        for file in [
            "index.html",
            "404.html",
            "en/index.html",
            "en/blog/index.html",
            "en/blog/hello/index.html",
            "it/blog/ciao/index.html",
            "es/blog/index.html",
            "sitemap.xml",
            "robots.txt",
            "static/css/site.css",
        ] {
            assert!(public.join(file).is_file(), "missing {}", file);
        }
        assert!(!public.join("es/blog/hello/index.html").exists());

        let root = fs::read_to_string(public.join("index.html")).unwrap();
        assert!(root.contains("url=/en"));

        let italian = fs::read_to_string(public.join("it/index.html")).unwrap();
        assert!(italian.contains("Diario"));
    }

    #[test]
    fn test_sitemap_can_be_disabled() {
        let dir = TempDir::new().unwrap();
        write(&dir, "_config.yml", "sitemap:\n  enable: false\n  robots: false\n");

        let folio = Folio::new(dir.path()).unwrap();
        Generator::new(&folio)
            .unwrap()
            .generate(&Collection::empty())
            .unwrap();

        let public = dir.path().join("public");
        assert!(public.join("en/index.html").is_file());
        assert!(!public.join("sitemap.xml").exists());
        assert!(!public.join("robots.txt").exists());
    }
}
