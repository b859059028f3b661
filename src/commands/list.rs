//! List site content

use anyhow::Result;
use std::fmt::Write;

use crate::i18n::Locale;
use crate::query::PostQuery;
use crate::Folio;

/// List site content by type
pub fn run(folio: &Folio, content_type: &str, locale: Option<Locale>) -> Result<()> {
    print!("{}", render(folio, content_type, locale)?);
    Ok(())
}

/// The listing as printed by `run`
pub fn render(folio: &Folio, content_type: &str, locale: Option<Locale>) -> Result<String> {
    let collection = folio.collect()?;
    let query = PostQuery::new(&collection);
    let locales: Vec<Locale> = match locale {
        Some(locale) => vec![locale],
        None => folio.config.i18n.locales.clone(),
    };

    let mut out = String::new();
    match content_type {
        "post" | "posts" => {
            for locale in locales {
                let posts = query.list_by_locale(locale);
                writeln!(out, "Posts [{}] ({}):", locale, posts.len())?;
                for post in posts {
                    writeln!(
                        out,
                        "  {} - {} [{}]",
                        post.iso_date(),
                        post.title,
                        post.source
                    )?;
                }
            }
        }
        "tag" | "tags" => {
            for locale in locales {
                let tags = query.tags(locale);
                writeln!(out, "Tags [{}] ({}):", locale, tags.len())?;
                for (tag, count) in tags {
                    writeln!(out, "  {} ({})", tag, count)?;
                }
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, tag", content_type);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> (TempDir, Folio) {
        let dir = TempDir::new().unwrap();
        let posts = dir.path().join("content/posts");
        fs::create_dir_all(&posts).unwrap();
        for (name, date, lang, tags) in [
            ("a", "2024-01-05", "en", "[rust]"),
            ("b", "2024-01-15", "en", "[rust, web]"),
            ("c", "2024-01-10", "it", "[react]"),
        ] {
            fs::write(
                posts.join(format!("{}.mdx", name)),
                format!(
                    "---\ntitle: Post {}\ndate: {}\nsummary: S\ntags: {}\nlang: {}\n---\nBody\n",
                    name, date, tags, lang
                ),
            )
            .unwrap();
        }
        let folio = Folio::new(dir.path()).unwrap();
        (dir, folio)
    }

    #[test]
    fn test_list_posts_for_locale() {
        let (_dir, folio) = site();
        let out = render(&folio, "posts", Some(Locale::En)).unwrap();
        assert_eq!(
            out,
            "Posts [en] (2):\n  2024-01-15 - Post b [posts/b.mdx]\n  2024-01-05 - Post a [posts/a.mdx]\n"
        );
    }

    #[test]
    fn test_list_tags_for_every_locale() {
        let (_dir, folio) = site();
        let out = render(&folio, "tags", None).unwrap();
        assert!(out.contains("Tags [en] (2):\n  rust (2)\n  web (1)\n"));
        assert!(out.contains("Tags [it] (1):\n  react (1)\n"));
        assert!(out.contains("Tags [es] (0):\n"));
    }

    #[test]
    fn test_unknown_type() {
        let (_dir, folio) = site();
        assert!(render(&folio, "pages", None).is_err());
    }
}
