//! Internationalization (i18n) support
//!
//! Locale codes, request-path locale resolution and the UI message catalog.

mod locale;
mod resolver;

pub use locale::{Locale, UnknownLocale};
pub use resolver::{LocaleResolver, Resolution};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const BUILTIN_EN: &str = r#"
nav:
  home: Home
  blog: Blog
hero:
  tagline: I build calm, high-quality software, driven by a love for technology and reliable delivery.
  latest: Latest posts
  cta:
    downloadCV: Download CV
    contact: Get in touch
    blog: Read the blog
presentation:
  title: A short introduction
  subtitle: Who I am and how I work
  paragraph1: I care about software that stays fast and readable long after its first release.
  paragraph2: Most of my work sits where product, design and engineering meet, turning rough ideas into dependable interfaces.
  paragraph3: If that sounds like something your team needs, I would be glad to hear about it.
techStack:
  title: Tech stack
  subtitle: Tools I use every day
  categories:
    frontend: Frontend
    backend: Backend
    cloud: Cloud
cv:
  experience:
    title: Experience
contact:
  title: Let's talk
  description: Have a project in mind or just want to say hello? Reach out.
  labels:
    email: Email
    linkedin: LinkedIn
    github: GitHub
    schedule: Book a call
blog:
  title: Blog
  description: Thoughts on engineering, tooling and shipping software.
  noPostsFound: No posts found.
  backToBlog: Back to blog
  publishedOn: Published on
  prevPost: Previous post
  nextPost: Next post
  minRead: min read
language:
  toggle: Change language
notFound:
  title: Page not found
  description: The page you are looking for does not exist.
footer:
  rights: All rights reserved.
"#;

const BUILTIN_IT: &str = r#"
nav:
  home: Home
  blog: Blog
hero:
  tagline: Costruisco software curato e di qualità, guidato dalla passione per la tecnologia e da consegne affidabili.
  latest: Ultimi articoli
  cta:
    downloadCV: Scarica il CV
    contact: Contattami
    blog: Leggi il blog
presentation:
  title: Una breve presentazione
  subtitle: Chi sono e come lavoro
  paragraph1: Mi sta a cuore il software che resta veloce e leggibile anche molto dopo il primo rilascio.
  paragraph2: Gran parte del mio lavoro sta dove prodotto, design e ingegneria si incontrano, trasformando idee grezze in interfacce affidabili.
  paragraph3: Se è ciò di cui il tuo team ha bisogno, sarò felice di parlarne.
techStack:
  title: Stack tecnologico
  subtitle: Gli strumenti che uso ogni giorno
  categories:
    frontend: Frontend
    backend: Backend
    cloud: Cloud
cv:
  experience:
    title: Esperienza
contact:
  title: Parliamone
  description: Hai un progetto in mente o vuoi solo salutare? Scrivimi.
  labels:
    email: Email
    linkedin: LinkedIn
    github: GitHub
    schedule: Prenota una chiamata
blog:
  title: Blog
  description: Riflessioni su ingegneria, strumenti e rilascio del software.
  noPostsFound: Nessun articolo trovato.
  backToBlog: Torna al blog
  publishedOn: Pubblicato il
  prevPost: Articolo precedente
  nextPost: Articolo successivo
  minRead: min di lettura
language:
  toggle: Cambia lingua
notFound:
  title: Pagina non trovata
  description: La pagina che stai cercando non esiste.
footer:
  rights: Tutti i diritti riservati.
"#;

const BUILTIN_ES: &str = r#"
nav:
  home: Inicio
  blog: Blog
hero:
  tagline: Construyo software sereno y de alta calidad, impulsado por el amor a la tecnología y las entregas fiables.
  latest: Últimas entradas
  cta:
    downloadCV: Descargar CV
    contact: Contáctame
    blog: Leer el blog
presentation:
  title: Una breve presentación
  subtitle: Quién soy y cómo trabajo
  paragraph1: Me importa el software que sigue siendo rápido y legible mucho después de su primera versión.
  paragraph2: Gran parte de mi trabajo está donde se encuentran producto, diseño e ingeniería, convirtiendo ideas en bruto en interfaces fiables.
  paragraph3: Si es lo que tu equipo necesita, estaré encantado de escucharte.
techStack:
  title: Stack tecnológico
  subtitle: Las herramientas que uso cada día
  categories:
    frontend: Frontend
    backend: Backend
    cloud: Nube
cv:
  experience:
    title: Experiencia
contact:
  title: Hablemos
  description: ¿Tienes un proyecto en mente o solo quieres saludar? Escríbeme.
  labels:
    email: Correo
    linkedin: LinkedIn
    github: GitHub
    schedule: Reservar una llamada
blog:
  title: Blog
  description: Reflexiones sobre ingeniería, herramientas y publicación de software.
  noPostsFound: No se encontraron entradas.
  backToBlog: Volver al blog
  publishedOn: Publicado el
  prevPost: Entrada anterior
  nextPost: Entrada siguiente
  minRead: min de lectura
language:
  toggle: Cambiar idioma
notFound:
  title: Página no encontrada
  description: La página que buscas no existe.
footer:
  rights: Todos los derechos reservados.
"#;

type Catalog = HashMap<String, Value>;

/// UI message catalog, one per locale, with fallback to the default locale
#[derive(Debug, Clone)]
pub struct Messages {
    fallback: Locale,
    /// Locale -> key -> translation
    translations: HashMap<Locale, Catalog>,
}

impl Messages {
    /// Create an empty catalog
    pub fn new(fallback: Locale) -> Self {
        Self {
            fallback,
            translations: HashMap::new(),
        }
    }

    /// Catalog pre-filled with the built-in strings for every locale
    pub fn builtin(fallback: Locale) -> Self {
        let mut messages = Self::new(fallback);
        for (locale, source) in [
            (Locale::En, BUILTIN_EN),
            (Locale::It, BUILTIN_IT),
            (Locale::Es, BUILTIN_ES),
        ] {
            // The built-in catalogs are constants; a parse failure here is a typo in this file.
            match serde_yaml::from_str::<Catalog>(source) {
                Ok(catalog) => messages.merge(locale, catalog),
                Err(e) => tracing::error!("Built-in {} messages are invalid: {}", locale, e),
            }
        }
        messages
    }

    /// Load `{locale}.yml|yaml|json` files from a directory on top of the current catalog
    pub fn load_dir<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir).with_context(|| format!("failed to list {:?}", dir))? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str());
            if !matches!(ext, Some("yml") | Some("yaml") | Some("json")) {
                continue;
            }

            let Some(locale) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(Locale::from_code)
            else {
                tracing::debug!("Skipping message file for unknown locale: {:?}", path);
                continue;
            };

            let content =
                fs::read_to_string(&path).with_context(|| format!("failed to read {:?}", path))?;
            // JSON is a subset of YAML, one parser covers both
            let catalog: Catalog = serde_yaml::from_str(&content)
                .with_context(|| format!("failed to parse message file {:?}", path))?;
            self.merge(locale, catalog);
            tracing::debug!("Loaded message file: {:?}", path);
        }

        Ok(())
    }

    /// Overlay `catalog` onto the locale's catalog; nested mappings merge
    /// key by key, anything else replaces the existing entry
    fn merge(&mut self, locale: Locale, catalog: Catalog) {
        let target = self.translations.entry(locale).or_default();
        for (key, value) in catalog {
            match target.get_mut(&key) {
                Some(existing) => merge_value(existing, value),
                None => {
                    target.insert(key, value);
                }
            }
        }
    }

    /// Get a translation; key can be nested like "blog.title"
    pub fn get(&self, locale: Locale, key: &str) -> String {
        self.lookup(locale, key).unwrap_or_else(|| key.to_string())
    }

    /// Like `get`, but `None` when neither the locale nor the fallback has the key
    pub fn lookup(&self, locale: Locale, key: &str) -> Option<String> {
        [locale, self.fallback].into_iter().find_map(|lang| {
            self.translations
                .get(&lang)
                .and_then(|data| get_nested_value(data, key))
                .map(yaml_value_to_string)
        })
    }

    /// Deserialize a structured entry such as a list of roles
    ///
    /// A malformed entry is skipped with a warning so the fallback locale
    /// can still supply it.
    pub fn section<T: DeserializeOwned>(&self, locale: Locale, key: &str) -> Option<T> {
        for lang in [locale, self.fallback] {
            let Some(value) = self
                .translations
                .get(&lang)
                .and_then(|data| get_nested_value(data, key))
            else {
                continue;
            };
            match serde_yaml::from_value(value.clone()) {
                Ok(section) => return Some(section),
                Err(e) => tracing::warn!("Ignoring malformed {} message `{}`: {}", lang, key, e),
            }
        }
        None
    }

    /// All translations for a locale as a flat dot-notation map,
    /// missing keys filled from the fallback locale
    pub fn flatten(&self, locale: Locale) -> HashMap<String, String> {
        let mut result = HashMap::new();

        if let Some(data) = self.translations.get(&locale) {
            flatten_translations(data, "", &mut result);
        }

        if locale != self.fallback {
            if let Some(data) = self.translations.get(&self.fallback) {
                let mut fallback = HashMap::new();
                flatten_translations(data, "", &mut fallback);
                for (k, v) in fallback {
                    result.entry(k).or_insert(v);
                }
            }
        }

        result
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::builtin(Locale::En)
    }
}

fn merge_value(target: &mut Value, value: Value) {
    match (target, value) {
        (Value::Mapping(existing), Value::Mapping(new)) => {
            for (k, v) in new {
                match existing.get_mut(&k) {
                    Some(slot) => merge_value(slot, v),
                    None => {
                        existing.insert(k, v);
                    }
                }
            }
        }
        (target, value) => *target = value,
    }
}

/// Get a nested value from a YAML map using dot notation
fn get_nested_value<'a>(data: &'a Catalog, key: &str) -> Option<&'a Value> {
    let mut parts = key.split('.');
    let mut current = data.get(parts.next()?);

    for part in parts {
        current = match current {
            Some(Value::Mapping(map)) => map.get(part),
            _ => return None,
        };
    }

    current
}

/// Convert a YAML value to a string
fn yaml_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => format!("{:?}", value),
    }
}

/// Flatten translations into a HashMap with dot-notation keys
fn flatten_translations(data: &Catalog, prefix: &str, result: &mut HashMap<String, String>) {
    for (key, value) in data {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::String(s) => {
                result.insert(full_key, s.clone());
            }
            Value::Number(n) => {
                result.insert(full_key, n.to_string());
            }
            Value::Bool(b) => {
                result.insert(full_key, b.to_string());
            }
            Value::Mapping(map) => {
                let nested: Catalog = map
                    .iter()
                    .filter_map(|(k, v)| k.as_str().map(|k| (k.to_string(), v.clone())))
                    .collect();
                flatten_translations(&nested, &full_key, result);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalogs_cover_every_locale() {
        let messages = Messages::builtin(Locale::En);
        let keys = messages.flatten(Locale::En).into_keys().collect::<Vec<_>>();
        for locale in Locale::ALL {
            let own = &messages.translations[&locale];
            for key in &keys {
                assert!(get_nested_value(own, key).is_some(), "{} lacks {}", locale, key);
            }
        }
        assert_eq!(messages.get(Locale::It, "blog.backToBlog"), "Torna al blog");
        assert_eq!(messages.get(Locale::Es, "nav.home"), "Inicio");
    }

    #[test]
    fn test_missing_key_falls_back_then_returns_key() {
        let mut messages = Messages::new(Locale::En);
        messages.merge(
            Locale::En,
            serde_yaml::from_str("menu:\n  about: About\n").unwrap(),
        );
        assert_eq!(messages.get(Locale::It, "menu.about"), "About");
        assert_eq!(messages.get(Locale::It, "menu.unknown"), "menu.unknown");
        assert_eq!(messages.lookup(Locale::It, "menu.unknown"), None);
    }

    #[test]
    fn test_load_dir_overlays_builtin_strings() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("it.yml"),
            "blog:\n  title: Il mio blog\nhero:\n  name: Riccardo\n",
        )
        .unwrap();
        fs::write(dir.path().join("es.json"), r#"{"blog": {"title": "Mi blog"}}"#).unwrap();
        fs::write(dir.path().join("fr.yml"), "blog:\n  title: Le blog\n").unwrap();

        let mut messages = Messages::builtin(Locale::En);
        messages.load_dir(dir.path()).unwrap();

        assert_eq!(messages.get(Locale::It, "blog.title"), "Il mio blog");
        assert_eq!(messages.get(Locale::It, "hero.name"), "Riccardo");
        // sibling keys from the built-in catalog survive the overlay
        assert_eq!(messages.get(Locale::It, "blog.backToBlog"), "Torna al blog");
        assert_eq!(messages.get(Locale::Es, "blog.title"), "Mi blog");
    }

    #[test]
    fn test_load_dir_rejects_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("en.yml"), "blog: [unclosed\n").unwrap();
        let mut messages = Messages::new(Locale::En);
        let err = messages.load_dir(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("en.yml"));
    }

    #[test]
    fn test_flatten_merges_fallback_keys() {
        let mut messages = Messages::new(Locale::En);
        messages.merge(
            Locale::En,
            serde_yaml::from_str("home: Home\nmenu:\n  archives: Archives\n").unwrap(),
        );
        messages.merge(Locale::Es, serde_yaml::from_str("home: Inicio\n").unwrap());

        let all = messages.flatten(Locale::Es);
        assert_eq!(all.get("home"), Some(&"Inicio".to_string()));
        assert_eq!(all.get("menu.archives"), Some(&"Archives".to_string()));
    }

    #[test]
    fn test_overlay_merges_nested_blocks() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("en.yml"),
            "contact:\n  labels:\n    email: Write to me\n  email: me@example.dev\n",
        )
        .unwrap();

        let mut messages = Messages::builtin(Locale::En);
        messages.load_dir(dir.path()).unwrap();

        assert_eq!(messages.get(Locale::En, "contact.labels.email"), "Write to me");
        assert_eq!(messages.get(Locale::En, "contact.labels.github"), "GitHub");
        assert_eq!(messages.get(Locale::En, "contact.title"), "Let's talk");
        assert_eq!(
            messages.lookup(Locale::En, "contact.email").as_deref(),
            Some("me@example.dev")
        );
    }

    #[test]
    fn test_section_deserializes_with_fallback() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Role {
            role: String,
            achievements: Vec<String>,
        }

        let mut messages = Messages::new(Locale::En);
        messages.merge(
            Locale::En,
            serde_yaml::from_str("roles:\n  - role: Engineer\n    achievements: [Shipped]\n")
                .unwrap(),
        );
        messages.merge(Locale::It, serde_yaml::from_str("roles: not a list\n").unwrap());

        let expected = vec![Role {
            role: "Engineer".to_string(),
            achievements: vec!["Shipped".to_string()],
        }];
        assert_eq!(messages.section::<Vec<Role>>(Locale::En, "roles"), Some(expected));
        // the malformed Italian entry falls back to English
        assert_eq!(
            messages.section::<Vec<Role>>(Locale::It, "roles").map(|r| r.len()),
            Some(1)
        );
        assert!(messages.section::<Vec<Role>>(Locale::Es, "missing").is_none());
    }
}
