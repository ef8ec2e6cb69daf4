//! Bare URL detection in text events.

use pulldown_cmark::{CowStr, Event, LinkType, Tag, TagEnd};
use regex::Regex;
use std::sync::OnceLock;

static URL_REGEX: OnceLock<Regex> = OnceLock::new();

fn url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| Regex::new(r#"(?i)\b(?:https?://|www\.)[^\s<>"]+"#).unwrap())
}

/// Turns bare `http(s)://` and `www.` URLs into links
pub struct AutolinkTransformer;

impl AutolinkTransformer {
    pub fn new() -> Self {
        Self
    }

    pub fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut result = Vec::with_capacity(events.len());
        // Links, images and code blocks already own their text
        let mut opaque_depth = 0usize;

        for event in events {
            match event {
                Event::Start(Tag::Link { .. } | Tag::Image { .. } | Tag::CodeBlock(_)) => {
                    opaque_depth += 1;
                    result.push(event);
                }
                Event::End(TagEnd::Link | TagEnd::Image | TagEnd::CodeBlock) => {
                    opaque_depth = opaque_depth.saturating_sub(1);
                    result.push(event);
                }
                Event::InlineHtml(ref tag) if is_anchor_open(tag) => {
                    opaque_depth += 1;
                    result.push(event);
                }
                Event::InlineHtml(ref tag) if is_anchor_close(tag) => {
                    opaque_depth = opaque_depth.saturating_sub(1);
                    result.push(event);
                }
                Event::Text(text) if opaque_depth == 0 && url_regex().is_match(&text) => {
                    linkify_text(&text, &mut result);
                }
                other => result.push(other),
            }
        }

        result
    }
}

impl Default for AutolinkTransformer {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw `<a ...>` opening tag
fn is_anchor_open(tag: &str) -> bool {
    let lower = tag.trim_start().to_ascii_lowercase();
    lower
        .strip_prefix("<a")
        .and_then(|rest| rest.chars().next())
        .map(|c| c == '>' || c.is_whitespace())
        .unwrap_or(false)
}

/// Raw `</a>` closing tag
fn is_anchor_close(tag: &str) -> bool {
    let lower = tag.trim_start().to_ascii_lowercase();
    lower
        .strip_prefix("</a")
        .map(|rest| rest.trim_start().starts_with('>'))
        .unwrap_or(false)
}

fn linkify_text<'a>(text: &str, out: &mut Vec<Event<'a>>) {
    let mut cursor = 0;

    for m in url_regex().find_iter(text) {
        let url = trim_url(m.as_str());
        if url.is_empty() {
            continue;
        }
        let start = m.start();
        let end = start + url.len();

        if start > cursor {
            out.push(Event::Text(CowStr::from(text[cursor..start].to_string())));
        }

        let href = if url.to_ascii_lowercase().starts_with("www.") {
            format!("http://{}", url)
        } else {
            url.to_string()
        };

        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(href),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        out.push(Event::Text(CowStr::from(url.to_string())));
        out.push(Event::End(TagEnd::Link));

        cursor = end;
    }

    if cursor < text.len() {
        out.push(Event::Text(CowStr::from(text[cursor..].to_string())));
    }
}

/// Drop trailing sentence punctuation and an unbalanced closing paren
fn trim_url(url: &str) -> &str {
    let mut trimmed = url;
    loop {
        let before = trimmed;
        trimmed = trimmed.trim_end_matches(['.', ',', ';', ':', '!', '?', '\'']);
        if trimmed.ends_with(')') && trimmed.matches('(').count() < trimmed.matches(')').count() {
            trimmed = &trimmed[..trimmed.len() - 1];
        }
        if trimmed == before {
            return trimmed;
        }
    }
}
