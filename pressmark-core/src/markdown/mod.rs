//! Markdown rendering with highlighting and fragment post-processing.

pub mod autolink;
pub mod highlight;

use crate::slug::tag_regex;
use pulldown_cmark::{html, Event, Options, Parser, TextMergeStream};
use regex::Regex;
use std::sync::OnceLock;

pub use autolink::AutolinkTransformer;
pub use highlight::{highlight_css, Highlight, HighlightTransformer, SyntectHighlighter};

static FIRST_H1_REGEX: OnceLock<Regex> = OnceLock::new();
static IMG_TAG_REGEX: OnceLock<Regex> = OnceLock::new();

fn first_h1_regex() -> &'static Regex {
    FIRST_H1_REGEX.get_or_init(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").unwrap())
}

fn img_tag_regex() -> &'static Regex {
    IMG_TAG_REGEX.get_or_init(|| Regex::new(r"(?i)<img\b[^>]*>").unwrap())
}

/// Markdown renderer with a pluggable code highlighter
pub struct MarkdownRenderer {
    options: Options,
    highlighter: Box<dyn Highlight + Send + Sync>,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::with_highlighter(SyntectHighlighter::new())
    }

    pub fn with_highlighter(highlighter: impl Highlight + Send + Sync + 'static) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);

        Self {
            options,
            highlighter: Box::new(highlighter),
        }
    }

    /// Convert markdown to an HTML fragment.
    ///
    /// Raw HTML passes through, bare URLs are linked, and single newlines
    /// become line breaks.
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let events: Vec<Event> = TextMergeStream::new(parser).collect();

        let events = hard_breaks(events);

        let autolink_transformer = AutolinkTransformer::new();
        let events = autolink_transformer.transform(events);

        let highlight_transformer = HighlightTransformer::new(self.highlighter.as_ref());
        let events = highlight_transformer.transform(events);

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Render a document body and apply the page post-processing:
    /// drop an `<h1>` that repeats `title`, then lazy-load images.
    pub fn render_body(&self, markdown: &str, title: &str) -> String {
        let html = self.render(markdown);
        let html = strip_duplicate_title(&html, title);
        add_lazy_loading(&html)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn hard_breaks(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    events
        .into_iter()
        .map(|event| match event {
            Event::SoftBreak => Event::HardBreak,
            other => other,
        })
        .collect()
}

/// Remove the first `<h1>` element when its text equals `title`.
///
/// The heading text is compared as rendered, with entities still encoded,
/// so `# Q & A` (`Q &amp; A`) does not match the title `Q & A` and the
/// heading stays.
pub fn strip_duplicate_title(html: &str, title: &str) -> String {
    let Some(captures) = first_h1_regex().captures(html) else {
        return html.to_string();
    };

    let text = tag_regex().replace_all(&captures[1], "");
    let text = text.trim();
    if text.is_empty() || text != title.trim() {
        return html.to_string();
    }

    let whole = captures.get(0).map(|m| m.range()).unwrap_or(0..0);
    let mut out = String::with_capacity(html.len());
    out.push_str(&html[..whole.start]);
    out.push_str(&html[whole.end..]);
    out
}

/// Add `loading="lazy"` to every `<img>` that does not declare `loading`
pub fn add_lazy_loading(html: &str) -> String {
    img_tag_regex()
        .replace_all(html, |caps: &regex::Captures| {
            let tag = &caps[0];
            if tag.to_ascii_lowercase().contains("loading=") {
                return tag.to_string();
            }
            format!("{} loading=\"lazy\" {}", &tag[..4], tag[4..].trim_start())
        })
        .into_owned()
}
