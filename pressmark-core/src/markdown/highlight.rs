//! Code syntax highlighting using syntect.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Tag, TagEnd};
use std::sync::OnceLock;
use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Theme used when the configured one is unknown
pub const DEFAULT_THEME: &str = "InspiredGitHub";

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

/// Code-highlighting hook used by the markdown renderer.
///
/// Implementations must always return renderable HTML for a complete
/// `<pre>` block, whatever the input.
pub trait Highlight {
    fn highlight(&self, code: &str, lang: Option<&str>) -> String;
}

/// Highlighter backed by syntect's bundled grammars.
///
/// Tries the declared language, then first-line detection, then falls back
/// to escaped plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntectHighlighter;

impl SyntectHighlighter {
    pub fn new() -> Self {
        Self
    }

    fn find_declared(&self, lang: &str) -> Option<&'static SyntaxReference> {
        let ss = syntax_set();
        ss.find_syntax_by_token(lang)
            .or_else(|| ss.find_syntax_by_extension(lang))
    }

    fn detect(&self, code: &str) -> Option<&'static SyntaxReference> {
        let first_line = code.lines().next()?;
        syntax_set().find_syntax_by_first_line(first_line)
    }

    fn classed_html(&self, code: &str, syntax: &SyntaxReference) -> Option<String> {
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set(), CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            if let Err(err) = generator.parse_html_for_line_which_includes_newline(line) {
                tracing::debug!("Highlighting as {} failed: {}", syntax.name, err);
                return None;
            }
        }
        Some(generator.finalize())
    }
}

impl Highlight for SyntectHighlighter {
    fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        if let Some(lang) = lang {
            let highlighted = self
                .find_declared(lang)
                .and_then(|syntax| self.classed_html(code, syntax));
            if let Some(html) = highlighted {
                return format!(
                    "<pre><code class=\"hljs language-{}\">{}</code></pre>",
                    html_escape(lang),
                    html
                );
            }
        }

        let detected = self
            .detect(code)
            .and_then(|syntax| self.classed_html(code, syntax));
        if let Some(html) = detected {
            return format!("<pre><code class=\"hljs\">{}</code></pre>", html);
        }

        format!("<pre><code>{}</code></pre>", html_escape(code))
    }
}

/// Stylesheet matching the classes emitted by [`SyntectHighlighter`]
pub fn highlight_css(theme_name: &str) -> Option<String> {
    let themes = &theme_set().themes;
    let theme = match themes.get(theme_name) {
        Some(theme) => theme,
        None => {
            tracing::warn!(
                "Unknown highlight theme '{}', using {}",
                theme_name,
                DEFAULT_THEME
            );
            themes.get(DEFAULT_THEME)?
        }
    };

    match css_for_theme_with_class_style(theme, CLASS_STYLE) {
        Ok(css) => Some(css),
        Err(err) => {
            tracing::warn!("Failed to generate highlight CSS: {}", err);
            None
        }
    }
}

/// Transformer replacing fenced code blocks with highlighter output
pub struct HighlightTransformer<'h> {
    highlighter: &'h dyn Highlight,
}

impl<'h> HighlightTransformer<'h> {
    pub fn new(highlighter: &'h dyn Highlight) -> Self {
        Self { highlighter }
    }

    /// Transform events, highlighting fenced code blocks.
    ///
    /// Indented blocks are left to the renderer.
    pub fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut result = Vec::with_capacity(events.len());
        let mut fence: Option<Option<String>> = None;
        let mut code_content = String::new();

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                    fence = Some(fence_language(&info));
                    code_content.clear();
                }
                Event::Text(text) if fence.is_some() => {
                    code_content.push_str(&text);
                }
                Event::End(TagEnd::CodeBlock) if fence.is_some() => {
                    let lang = fence.take().flatten();
                    let html = self.highlighter.highlight(&code_content, lang.as_deref());
                    result.push(Event::Html(CowStr::from(html)));
                }
                other => result.push(other),
            }
        }

        result
    }
}

/// First word of a fence info string (`rust,ignore` → `rust`)
fn fence_language(info: &str) -> Option<String> {
    info.split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
}

pub(crate) fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
