//! Locale resolution for inbound request paths
//!
//! Every localized URL starts with a locale segment. A path whose first
//! segment is a supported locale resolves to that locale and the remaining
//! route; anything else is redirected to the same path under the default
//! locale, so the address bar always shows an explicit locale.

use crate::config::I18nConfig;

use super::Locale;

/// Outcome of resolving a request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The path carries a supported locale
    Resolved {
        locale: Locale,
        /// Remainder of the path, always starting with `/`
        route: String,
    },
    /// The path must be re-requested under the default locale
    Redirect { location: String, permanent: bool },
}

/// Maps request paths to locales
#[derive(Debug, Clone)]
pub struct LocaleResolver {
    locales: Vec<Locale>,
    default_locale: Locale,
    permanent: bool,
}

impl LocaleResolver {
    pub fn new(config: &I18nConfig) -> Self {
        Self {
            locales: config.locales.clone(),
            default_locale: config.default_locale,
            permanent: config.permanent_redirect,
        }
    }

    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    pub fn default_locale(&self) -> Locale {
        self.default_locale
    }

    /// Whether `locale` is served by this site
    pub fn supports(&self, locale: Locale) -> bool {
        self.locales.contains(&locale)
    }

    /// Resolve a request path (without query string)
    pub fn resolve(&self, path: &str) -> Resolution {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        let rest = &path[1..];
        let first = rest.split('/').next().unwrap_or_default();

        if let Some(locale) = Locale::from_code(first).filter(|l| self.supports(*l)) {
            let route = &rest[first.len()..];
            let route = if route.is_empty() { "/" } else { route };
            return Resolution::Resolved {
                locale,
                route: route.to_string(),
            };
        }

        // Unsupported or missing locale: prefix the whole original path,
        // including a segment that merely looks like a locale.
        Resolution::Redirect {
            location: self.localize(self.default_locale, &path),
            permanent: self.permanent,
        }
    }

    /// Build the public path of `route` under `locale`
    pub fn localize(&self, locale: Locale, route: &str) -> String {
        let route = route.trim_start_matches('/');
        if route.is_empty() {
            format!("/{}", locale)
        } else {
            format!("/{}/{}", locale, route)
        }
    }

    /// Same page, other language (used by the language switcher)
    pub fn switch_locale(&self, path: &str, to: Locale) -> String {
        match self.resolve(path) {
            Resolution::Resolved { route, .. } => self.localize(to, &route),
            Resolution::Redirect { .. } => self.localize(to, path),
        }
    }
}

impl Default for LocaleResolver {
    fn default() -> Self {
        Self::new(&I18nConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redirect(location: &str) -> Resolution {
        Resolution::Redirect {
            location: location.to_string(),
            permanent: false,
        }
    }

    fn resolved(locale: Locale, route: &str) -> Resolution {
        Resolution::Resolved {
            locale,
            route: route.to_string(),
        }
    }

    #[test]
    fn test_root_redirects_to_default_locale() {
        let resolver = LocaleResolver::default();
        assert_eq!(resolver.resolve("/"), redirect("/en"));
        assert_eq!(resolver.resolve(""), redirect("/en"));
    }

    #[test]
    fn test_supported_locale_resolves_with_route() {
        let resolver = LocaleResolver::default();
        assert_eq!(resolver.resolve("/it"), resolved(Locale::It, "/"));
        assert_eq!(resolver.resolve("/es/"), resolved(Locale::Es, "/"));
        assert_eq!(resolver.resolve("/en/blog"), resolved(Locale::En, "/blog"));
        assert_eq!(
            resolver.resolve("/it/blog/hello-world"),
            resolved(Locale::It, "/blog/hello-world")
        );
    }

    #[test]
    fn test_unsupported_locale_is_prefixed_not_stripped() {
        let resolver = LocaleResolver::default();
        assert_eq!(resolver.resolve("/fr/blog"), redirect("/en/fr/blog"));
        assert_eq!(resolver.resolve("/blog"), redirect("/en/blog"));
        assert_eq!(resolver.resolve("/EN/blog"), redirect("/en/EN/blog"));
    }

    #[test]
    fn test_locale_must_be_a_whole_segment() {
        let resolver = LocaleResolver::default();
        assert_eq!(resolver.resolve("/english"), redirect("/en/english"));
        assert_eq!(resolver.resolve("/enblog"), redirect("/en/enblog"));
    }

    #[test]
    fn test_locale_missing_from_config_is_unsupported() {
        let config = I18nConfig {
            locales: vec![Locale::It, Locale::En],
            default_locale: Locale::It,
            permanent_redirect: true,
            ..Default::default()
        };
        let resolver = LocaleResolver::new(&config);
        assert_eq!(
            resolver.resolve("/es/blog"),
            Resolution::Redirect {
                location: "/it/es/blog".to_string(),
                permanent: true,
            }
        );
        assert_eq!(resolver.resolve("/en"), resolved(Locale::En, "/"));
    }

    #[test]
    fn test_switch_locale_keeps_the_route() {
        let resolver = LocaleResolver::default();
        assert_eq!(resolver.switch_locale("/en/blog/post", Locale::Es), "/es/blog/post");
        assert_eq!(resolver.switch_locale("/it", Locale::En), "/en");
        assert_eq!(resolver.switch_locale("/blog", Locale::It), "/it/blog");
    }
}
