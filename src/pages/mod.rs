//! Page rendering shared by the static generator and the dev server

use anyhow::Result;
use tera::Context;

use crate::config::SiteConfig;
use crate::content::Collection;
use crate::helpers::encode_path;
use crate::i18n::{Locale, LocaleResolver, Messages};
use crate::query::{PostQuery, QueryError};
use crate::seo::{self, PageMeta};
use crate::templates::{
    ContactLink, LanguageLink, NavData, NavPost, PostCard, Role, SiteData, TagData, TechBadge,
    TemplateRenderer,
};

/// Posts featured on the home page
const HOME_POSTS: usize = 3;

/// Contact channels: message key under `contact`, label key under `contact.labels`
const CONTACTS: [(&str, &str); 4] = [
    ("email", "email"),
    ("linkedin", "linkedin"),
    ("github", "github"),
    ("calendly", "schedule"),
];

/// Locale-relative route of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Home,
    Blog,
    Post(&'a str),
    Unknown,
}

impl<'a> Route<'a> {
    /// Classify the route left after locale resolution, e.g. `/blog/hello`
    pub fn parse(route: &'a str) -> Self {
        let trimmed = route.trim_matches('/');
        let mut segments = trimmed.split('/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some(""), None, None) => Route::Home,
            (Some("blog"), None, None) => Route::Blog,
            (Some("blog"), Some(slug), None) if !slug.is_empty() => Route::Post(slug),
            _ => Route::Unknown,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    NotFound(#[from] QueryError),

    #[error("failed to render {template}: {source}")]
    Template {
        template: &'static str,
        #[source]
        source: tera::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Ok,
    NotFound,
}

#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub status: PageStatus,
    pub html: String,
}

/// Renders localized pages from a collection snapshot
pub struct PageRenderer {
    config: SiteConfig,
    resolver: LocaleResolver,
    messages: Messages,
    templates: TemplateRenderer,
}

impl PageRenderer {
    pub fn new(config: &SiteConfig, messages: Messages) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            resolver: LocaleResolver::new(&config.i18n),
            messages,
            templates: TemplateRenderer::new()?,
        })
    }

    pub fn resolver(&self) -> &LocaleResolver {
        &self.resolver
    }

    /// Render any route; unknown routes and posts yield the 404 page
    pub fn render_route(
        &self,
        collection: &Collection,
        locale: Locale,
        route: &str,
    ) -> Result<RenderedPage, RenderError> {
        let html = match Route::parse(route) {
            Route::Home => self.render_home(collection, locale)?,
            Route::Blog => self.render_blog_index(collection, locale)?,
            Route::Post(slug) => match self.render_post(collection, locale, slug) {
                Err(RenderError::NotFound(e)) => {
                    tracing::debug!("{}", e);
                    return self.not_found(locale);
                }
                other => other?,
            },
            Route::Unknown => return self.not_found(locale),
        };

        Ok(RenderedPage {
            status: PageStatus::Ok,
            html,
        })
    }

    pub fn render_home(&self, collection: &Collection, locale: Locale) -> Result<String, RenderError> {
        let query = PostQuery::new(collection);
        let posts: Vec<PostCard> = query
            .list_by_locale(locale)
            .into_iter()
            .take(HOME_POSTS)
            .map(PostCard::from)
            .collect();

        let meta = PageMeta::new(
            &self.config,
            &self.resolver,
            locale,
            "/",
            None,
            &self.messages.get(locale, "hero.tagline"),
        );
        let json_ld = vec![seo::json_ld(&seo::person_schema(&self.config))];

        let stack: Vec<TechBadge> = self
            .config
            .stack
            .iter()
            .map(|tech| TechBadge {
                name: tech.name.clone(),
                category: tech.category.clone(),
                label: self
                    .messages
                    .get(locale, &format!("techStack.categories.{}", tech.category)),
            })
            .collect();
        let roles: Vec<Role> = self
            .messages
            .section(locale, "cv.experience.roles")
            .unwrap_or_default();

        let mut context = self.base_context(locale, "/", &meta, json_ld, self.languages(locale, "/"));
        context.insert("posts", &posts);
        context.insert("cv", &self.config.cv);
        context.insert("stack", &stack);
        context.insert("roles", &roles);
        context.insert("contacts", &self.contacts(locale));
        self.render("home.html", &context)
    }

    pub fn render_blog_index(
        &self,
        collection: &Collection,
        locale: Locale,
    ) -> Result<String, RenderError> {
        let query = PostQuery::new(collection);
        let posts: Vec<PostCard> = query
            .list_by_locale(locale)
            .into_iter()
            .map(PostCard::from)
            .collect();
        let tags: Vec<TagData> = query
            .tags(locale)
            .into_iter()
            .map(|(name, count)| TagData { name, count })
            .collect();

        let meta = PageMeta::new(
            &self.config,
            &self.resolver,
            locale,
            "/blog",
            Some(&self.messages.get(locale, "blog.title")),
            &self.messages.get(locale, "blog.description"),
        );

        let mut context =
            self.base_context(locale, "/blog", &meta, Vec::new(), self.languages(locale, "/blog"));
        context.insert("posts", &posts);
        context.insert("tags", &tags);
        self.render("blog_index.html", &context)
    }

    pub fn render_post(
        &self,
        collection: &Collection,
        locale: Locale,
        slug: &str,
    ) -> Result<String, RenderError> {
        let query = PostQuery::new(collection);
        let post = query.get_by_slug(locale, slug)?;
        let adjacent = query.get_adjacent(locale, slug)?;

        let route = format!("/blog/{}", slug);
        let translated: Vec<Locale> = self
            .resolver
            .locales()
            .iter()
            .copied()
            .filter(|&l| collection.get(l, slug).is_some())
            .collect();

        let meta = PageMeta::new(
            &self.config,
            &self.resolver,
            locale,
            &route,
            Some(&post.title),
            &post.summary,
        )
        .article(post, &translated);
        let json_ld = vec![seo::json_ld(&seo::blog_post_schema(&self.config, post))];

        // Untranslated posts switch to the other locale's blog index
        let languages = self
            .resolver
            .locales()
            .iter()
            .map(|&l| {
                let target = if translated.contains(&l) { route.as_str() } else { "/blog" };
                self.language_link(locale, l, target)
            })
            .collect();

        let mut context = self.base_context(locale, &route, &meta, json_ld, languages);
        context.insert("post", &PostCard::from(post));
        context.insert("content", &post.body.html);
        context.insert("previous", &adjacent.previous.map(NavPost::from));
        context.insert("next", &adjacent.next.map(NavPost::from));
        self.render("post.html", &context)
    }

    pub fn render_not_found(&self, locale: Locale) -> Result<String, RenderError> {
        let meta = PageMeta::new(
            &self.config,
            &self.resolver,
            locale,
            "/",
            Some(&self.messages.get(locale, "notFound.title")),
            &self.messages.get(locale, "notFound.description"),
        );
        let context = self.base_context(locale, "/", &meta, Vec::new(), self.languages(locale, "/"));
        self.render("not_found.html", &context)
    }

    /// Static stand-in for an HTTP redirect
    pub fn render_redirect(&self, location: &str) -> Result<String, RenderError> {
        let mut context = Context::new();
        context.insert("location", location);
        self.render("redirect.html", &context)
    }

    fn not_found(&self, locale: Locale) -> Result<RenderedPage, RenderError> {
        Ok(RenderedPage {
            status: PageStatus::NotFound,
            html: self.render_not_found(locale)?,
        })
    }

    fn base_context(
        &self,
        locale: Locale,
        route: &str,
        meta: &PageMeta,
        json_ld: Vec<String>,
        languages: Vec<LanguageLink>,
    ) -> Context {
        let mut context = Context::new();
        context.insert("site", &SiteData::from(&self.config));
        context.insert("lang", locale.code());
        context.insert("route", route);
        context.insert("t", &self.messages.flatten(locale));
        context.insert("meta", meta);
        context.insert("json_ld", &json_ld);
        context.insert(
            "nav",
            &NavData {
                home: self.resolver.localize(locale, "/"),
                blog: self.resolver.localize(locale, "/blog"),
            },
        );
        context.insert("languages", &languages);
        context.insert("current_year", &chrono::Local::now().format("%Y").to_string());
        context
    }

    /// Contact channels the messages provide an address for
    fn contacts(&self, locale: Locale) -> Vec<ContactLink> {
        CONTACTS
            .iter()
            .filter_map(|&(channel, label)| {
                let address = self.messages.lookup(locale, &format!("contact.{}", channel))?;
                let (href, external) = if channel == "email" {
                    (format!("mailto:{}", address), false)
                } else {
                    (address, true)
                };
                Some(ContactLink {
                    label: self.messages.get(locale, &format!("contact.labels.{}", label)),
                    href,
                    external,
                })
            })
            .collect()
    }

    fn languages(&self, current: Locale, route: &str) -> Vec<LanguageLink> {
        self.resolver
            .locales()
            .iter()
            .map(|&l| self.language_link(current, l, route))
            .collect()
    }

    fn language_link(&self, current: Locale, target: Locale, route: &str) -> LanguageLink {
        LanguageLink {
            code: target.code().to_string(),
            name: target.native_name().to_string(),
            url: encode_path(&self.resolver.localize(target, route)),
            current: target == current,
        }
    }

    fn render(&self, template: &'static str, context: &Context) -> Result<String, RenderError> {
        self.templates
            .render(template, context)
            .map_err(|source| RenderError::Template { template, source })
    }
}
