//! Site index composition: sorting, JSON serialization, and index page
//! rendering.

use crate::models::{PostSummary, Program};
use regex::{NoExpand, Regex};
use std::sync::OnceLock;

/// Marker replaced by the programs list
pub const PROGRAMS_MARKER: &str = "programs.json";

static STYLESHEET_LINK_REGEX: OnceLock<Regex> = OnceLock::new();

fn stylesheet_link_regex() -> &'static Regex {
    STYLESHEET_LINK_REGEX
        .get_or_init(|| Regex::new(r#"<link\s+rel="stylesheet"[^>]*href="index\.css"[^>]*>"#).unwrap())
}

fn marker_regex(name: &str) -> Regex {
    Regex::new(&format!(r"<!--\s*{}\s*-->", regex::escape(name))).unwrap()
}

/// Sort newest first by `YYYY-MM-DD` date.
///
/// `sort_by` is stable, so entries sharing a date keep their discovery
/// order.
pub fn sort_summaries(summaries: &mut [PostSummary]) {
    summaries.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Pretty JSON array of summaries
pub fn to_json(summaries: &[PostSummary]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summaries)
}

/// Fills the index template.
///
/// Like the page composer, summary fields go in unescaped.
#[derive(Debug, Clone, Default)]
pub struct IndexComposer {
    template: String,
    site_css: Option<String>,
    posts_marker: String,
}

impl IndexComposer {
    /// `posts_marker` names the comment marker receiving the posts list,
    /// e.g. `writes.json` for `<!-- writes.json -->`.
    pub fn new(
        template: impl Into<String>,
        site_css: Option<String>,
        posts_marker: impl Into<String>,
    ) -> Self {
        Self {
            template: template.into(),
            site_css,
            posts_marker: posts_marker.into(),
        }
    }

    pub fn compose(&self, posts: &[PostSummary], programs: &[Program]) -> String {
        let mut html = self.template.clone();

        if let Some(css) = &self.site_css {
            let inline = format!("<style>\n{}\n</style>", css);
            html = stylesheet_link_regex()
                .replace(&html, NoExpand(&inline))
                .into_owned();
        }

        let programs_html = render_programs(programs);
        let posts_html = render_posts(posts);

        html = marker_regex(PROGRAMS_MARKER)
            .replace(&html, NoExpand(&programs_html))
            .into_owned();
        html = marker_regex(&self.posts_marker)
            .replace(&html, NoExpand(&posts_html))
            .into_owned();
        html
    }
}

/// `<ul id="posts-list">` markup, or empty when there are no posts
pub fn render_posts(posts: &[PostSummary]) -> String {
    if posts.is_empty() {
        return String::new();
    }

    let items: Vec<String> = posts
        .iter()
        .map(|p| {
            let title = if p.title.is_empty() { "Untitled" } else { p.title.as_str() };
            format!(
                "        <li><span class=\"category {category}\">{category}</span><time>{date}</time>\
<a class=\"link\" target=\"_blank\" href=\"{href}\"><span>{title}</span></a>\
<small class=\"summary\">{summary}</small></li>",
                category = p.category,
                date = p.date,
                href = p.path,
                title = title,
                summary = p.summary,
            )
        })
        .collect();

    format!("      <ul id=\"posts-list\">\n{}\n      </ul>", items.join("\n"))
}

/// `<ul class="list">` markup for programs, or empty
pub fn render_programs(programs: &[Program]) -> String {
    if programs.is_empty() {
        return String::new();
    }

    let items: Vec<String> = programs
        .iter()
        .map(|p| {
            format!(
                "        <li>\n          <a class=\"link\" target=\"_blank\" href=\"{}\">{}</a>: \n          <small>{}</small>\n        </li>",
                p.link.as_deref().unwrap_or("#"),
                p.title.as_deref().unwrap_or_default(),
                p.summary.as_deref().unwrap_or_default(),
            )
        })
        .collect();

    format!("      <ul class=\"list\">\n{}\n      </ul>", items.join("\n"))
}
