//! MDX body compilation: Markdown with syntax highlighting, heading anchors
//! and pass-through components

use lazy_static::lazy_static;
use pulldown_cmark::{
    html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd,
};
use regex::Regex;
use std::collections::HashMap;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

lazy_static! {
    /// Opening, closing or self-closing tag of a capitalized (component) element
    static ref COMPONENT_TAG: Regex =
        Regex::new(r#"<(/?)([A-Z][A-Za-z0-9_.]*)(?:\s[^<>]*?)?\s*(/?)>"#).unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkdownError {
    #[error("component <{0}> is never closed")]
    UnclosedComponent(String),

    #[error("closing tag </{0}> has no matching opening tag")]
    UnexpectedClosing(String),

    #[error("expected </{expected}> but found </{found}>")]
    MismatchedComponent { expected: String, found: String },
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", false)
    }

    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    /// Compile an MDX body to HTML
    pub fn render(&self, source: &str) -> Result<String, MarkdownError> {
        let markdown = strip_esm(source);

        // Front-matter is split off beforehand, so no metadata block option here
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = Parser::new_ext(&markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut raw_html = String::new();
        let mut anchors = HeadingAnchors::default();

        let mut code_block: Option<(Option<String>, String)> = None;
        let mut heading: Option<(HeadingLevel, Option<String>, Vec<Event>)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) => {
                            // Info strings like "rust title=main.rs" keep the first word
                            let lang = lang.split_whitespace().next().unwrap_or("").to_string();
                            (!lang.is_empty()).then_some(lang)
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        let highlighted = self.highlight_code(&code, lang.as_deref());
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, code)) = code_block.as_mut() {
                        code.push_str(&text);
                    }
                }
                Event::Start(Tag::Heading { level, id, .. }) => {
                    heading = Some((level, id.map(|id| id.to_string()), Vec::new()));
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, id, inner)) = heading.take() {
                        let text = plain_text(&inner);
                        let id = anchors.assign(id.as_deref().unwrap_or(&text));
                        let tag = heading_tag(level);
                        events.push(Event::Html(CowStr::from(format!(
                            r##"<{tag} id="{id}"><a href="#{id}">"##
                        ))));
                        events.extend(inner);
                        events.push(Event::Html(CowStr::from(format!("</a></{tag}>\n"))));
                    }
                }
                event => {
                    if let Event::Html(ref fragment) | Event::InlineHtml(ref fragment) = event {
                        raw_html.push_str(fragment);
                    }
                    match heading.as_mut() {
                        Some((_, _, inner)) => inner.push(event),
                        None => events.push(event),
                    }
                }
            }
        }

        check_components(&raw_html)?;

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted = theme
            .and_then(|theme| highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok());

        match highlighted {
            Some(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, lang),
            Some(highlighted) => format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                lang, highlighted
            ),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                lang,
                crate::helpers::html_escape(code)
            ),
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();

        let gutter = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            lang,
            gutter,
            lines.join("\n")
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique heading ids, `intro`, `intro-1`, `intro-2`, ...
#[derive(Default)]
struct HeadingAnchors {
    seen: HashMap<String, usize>,
}

impl HeadingAnchors {
    fn assign(&mut self, text: &str) -> String {
        let mut base = slug::slugify(text);
        if base.is_empty() {
            base = "section".to_string();
        }
        let count = self.seen.entry(base.clone()).or_insert(0);
        let id = if *count == 0 {
            base
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;
        id
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

fn plain_text(events: &[Event]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Text(t) | Event::Code(t) => Some(t.as_ref()),
            _ => None,
        })
        .collect()
}

/// Drop top-level MDX `import`/`export` statements; code fences are left alone.
fn strip_esm(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut fence: Option<&str> = None;

    for line in source.split_inclusive('\n') {
        let trimmed = line.trim_start();
        match fence {
            Some(marker) => {
                if trimmed.starts_with(marker) {
                    fence = None;
                }
            }
            None => {
                if trimmed.starts_with("```") {
                    fence = Some("```");
                } else if trimmed.starts_with("~~~") {
                    fence = Some("~~~");
                } else if line.starts_with("import ") || line.starts_with("export ") {
                    continue;
                }
            }
        }
        out.push_str(line);
    }

    out
}

/// Components must nest properly; code blocks never reach this check.
fn check_components(html: &str) -> Result<(), MarkdownError> {
    let mut stack: Vec<&str> = Vec::new();

    for cap in COMPONENT_TAG.captures_iter(html) {
        let closing = !cap[1].is_empty();
        let self_closing = !cap[3].is_empty();
        let name = cap.get(2).map(|m| m.as_str()).unwrap_or_default();

        if self_closing {
            continue;
        }
        if !closing {
            stack.push(name);
            continue;
        }
        match stack.pop() {
            Some(open) if open == name => {}
            Some(open) => {
                return Err(MarkdownError::MismatchedComponent {
                    expected: open.to_string(),
                    found: name.to_string(),
                })
            }
            None => return Err(MarkdownError::UnexpectedClosing(name.to_string())),
        }
    }

    match stack.pop() {
        Some(open) => Err(MarkdownError::UnclosedComponent(open.to_string())),
        None => Ok(()),
    }
}
