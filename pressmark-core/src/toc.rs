//! Heading anchors and table-of-contents synthesis.

use crate::models::HeadingEntry;
use crate::slug::{slugify, tag_regex};
use regex::Regex;
use std::sync::OnceLock;

static HEADING_OPEN_REGEX: OnceLock<Regex> = OnceLock::new();

fn heading_open_regex() -> &'static Regex {
    HEADING_OPEN_REGEX.get_or_init(|| Regex::new(r"<h([1-3])>").unwrap())
}

/// Anchored fragment plus its table of contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anchored {
    pub html: String,
    pub toc_html: String,
    pub headings: Vec<HeadingEntry>,
}

/// Attach `id` attributes to `<h1>`..`<h3>` and build the nested TOC.
///
/// Headings whose slug comes out empty get `section-N`, with `N` counting
/// such fallbacks across the whole fragment. Repeated slugs are kept as-is.
pub fn anchorize(html: &str) -> Anchored {
    let mut out = String::with_capacity(html.len() + 64);
    let mut headings = Vec::new();
    let mut fallback_count = 0usize;
    let mut cursor = 0;

    while let Some(open) = heading_open_regex().captures_at(html, cursor) {
        let open_match = open.get(0).map(|m| m.range()).unwrap_or(cursor..cursor);
        let level = &open[1];
        let close_tag = format!("</h{}>", level);

        let inner_start = open_match.end;
        let Some(inner_len) = html[inner_start..].find(&close_tag) else {
            // Unmatched opener passes through; later headings still count
            out.push_str(&html[cursor..inner_start]);
            cursor = inner_start;
            continue;
        };
        let inner = &html[inner_start..inner_start + inner_len];

        let text = tag_regex().replace_all(inner, "").trim().to_string();
        let mut slug = slugify(&text);
        if slug.is_empty() {
            fallback_count += 1;
            slug = format!("section-{}", fallback_count);
        }

        out.push_str(&html[cursor..open_match.start]);
        out.push_str(&format!(
            "<h{level} id=\"{slug}\">{inner}</h{level}>",
            level = level,
            slug = slug,
            inner = inner
        ));

        headings.push(HeadingEntry {
            level: level.parse().unwrap_or(1),
            slug,
            text,
        });

        cursor = inner_start + inner_len + close_tag.len();
    }
    out.push_str(&html[cursor..]);

    let toc_html = render_toc(&headings);
    Anchored {
        html: out,
        toc_html,
        headings,
    }
}

/// Render headings as nested lists.
///
/// A deeper heading opens one `<ul class="toc-sub">` per level stepped
/// down; a shallower heading closes levels, never past the first heading's
/// level.
pub fn render_toc(headings: &[HeadingEntry]) -> String {
    let Some(first) = headings.first() else {
        return String::new();
    };

    let base = first.level;
    let mut open_levels: Vec<u8> = Vec::new();
    let mut current = base;
    let mut html = String::from("<ul class=\"toc-list\">\n");

    for heading in headings {
        while heading.level > current {
            current += 1;
            open_levels.push(current);
            html.push_str("<ul class=\"toc-sub\">");
        }
        while heading.level < current && open_levels.pop().is_some() {
            current -= 1;
            html.push_str("</ul>");
        }
        html.push_str(&format!(
            "<li class=\"toc-item level-{}\"><a href=\"#{}\">{}</a></li>",
            heading.level, heading.slug, heading.text
        ));
    }

    for _ in open_levels.drain(..) {
        html.push_str("</ul>");
    }
    html.push_str("\n</ul>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::MarkdownRenderer;

    fn entry(level: u8, slug: &str) -> HeadingEntry {
        HeadingEntry {
            level,
            slug: slug.to_string(),
            text: slug.to_uppercase(),
        }
    }

    #[test]
    fn test_anchors_headings_in_order() {
        let anchored = anchorize("<h1>Intro</h1>\n<p>x</p>\n<h2>Getting <em>Started</em></h2>\n");
        assert_eq!(
            anchored.html,
            "<h1 id=\"intro\">Intro</h1>\n<p>x</p>\n<h2 id=\"getting-started\">Getting <em>Started</em></h2>\n"
        );
        assert_eq!(anchored.headings.len(), 2);
        assert_eq!(anchored.headings[1].text, "Getting Started");
        assert_eq!(anchored.headings[1].level, 2);
    }

    #[test]
    fn test_level_four_and_attributed_headings_ignored() {
        let html = "<h4>Deep</h4><h2 class=\"x\">Styled</h2>";
        let anchored = anchorize(html);
        assert_eq!(anchored.html, html);
        assert!(anchored.headings.is_empty());
        assert_eq!(anchored.toc_html, "");
    }

    #[test]
    fn test_section_fallback_counts_across_levels() {
        let anchored = anchorize("<h1>!!!</h1><h2>Named</h2><h3>???</h3><h2>…</h2>");
        let slugs: Vec<&str> = anchored.headings.iter().map(|h| h.slug.as_str()).collect();
        assert_eq!(slugs, ["section-1", "named", "section-2", "section-3"]);
        assert!(anchored.html.contains("<h3 id=\"section-2\">???</h3>"));
    }

    #[test]
    fn test_duplicate_slugs_not_deduplicated() {
        let anchored = anchorize("<h2>Notes</h2><h2>Notes</h2>");
        assert_eq!(anchored.headings[0].slug, "notes");
        assert_eq!(anchored.headings[1].slug, "notes");
        assert_eq!(anchored.html.matches("id=\"notes\"").count(), 2);
    }

    #[test]
    fn test_cjk_heading() {
        let anchored = anchorize("<h2>快速 开始</h2>");
        assert_eq!(anchored.headings[0].slug, "快速-开始");
    }

    #[test]
    fn test_unclosed_heading_left_alone() {
        let html = "<h2>Broken";
        let anchored = anchorize(html);
        assert_eq!(anchored.html, html);
        assert!(anchored.headings.is_empty());
    }

    #[test]
    fn test_unclosed_heading_does_not_hide_later_headings() {
        let html = MarkdownRenderer::new().render("<h3>raw unclosed\n\n## Real Heading\n\n## Another\n");
        let anchored = anchorize(&html);

        assert_eq!(
            anchored.html,
            "<h3>raw unclosed\n<h2 id=\"real-heading\">Real Heading</h2>\n<h2 id=\"another\">Another</h2>\n"
        );
        let slugs: Vec<&str> = anchored.headings.iter().map(|h| h.slug.as_str()).collect();
        assert_eq!(slugs, ["real-heading", "another"]);
        insta::assert_snapshot!(anchored.toc_html, @r###"
        <ul class="toc-list">
        <li class="toc-item level-2"><a href="#real-heading">Real Heading</a></li><li class="toc-item level-2"><a href="#another">Another</a></li>
        </ul>
        "###);
    }

    #[test]
    fn test_unclosed_heading_between_valid_headings() {
        let anchored = anchorize("<h1>Top</h1><h3>stray<p>text</p><h2>Below</h2>");
        assert_eq!(
            anchored.html,
            "<h1 id=\"top\">Top</h1><h3>stray<p>text</p><h2 id=\"below\">Below</h2>"
        );
        assert_eq!(anchored.headings.len(), 2);
        assert!(anchored.toc_html.contains("<a href=\"#below\">Below</a>"));
    }

    #[test]
    fn test_empty_toc() {
        assert_eq!(render_toc(&[]), "");
        assert_eq!(anchorize("<p>nothing</p>").toc_html, "");
    }

    #[test]
    fn test_toc_flat() {
        let toc = render_toc(&[entry(2, "a"), entry(2, "b")]);
        insta::assert_snapshot!(toc, @r###"
        <ul class="toc-list">
        <li class="toc-item level-2"><a href="#a">A</a></li><li class="toc-item level-2"><a href="#b">B</a></li>
        </ul>
        "###);
    }

    #[test]
    fn test_toc_nesting() {
        let toc = render_toc(&[entry(1, "a"), entry(3, "b"), entry(2, "c"), entry(1, "d")]);
        assert_eq!(
            toc,
            concat!(
                "<ul class=\"toc-list\">\n",
                "<li class=\"toc-item level-1\"><a href=\"#a\">A</a></li>",
                "<ul class=\"toc-sub\"><ul class=\"toc-sub\">",
                "<li class=\"toc-item level-3\"><a href=\"#b\">B</a></li>",
                "</ul>",
                "<li class=\"toc-item level-2\"><a href=\"#c\">C</a></li>",
                "</ul>",
                "<li class=\"toc-item level-1\"><a href=\"#d\">D</a></li>",
                "\n</ul>"
            )
        );
    }

    #[test]
    fn test_toc_closes_trailing_levels() {
        let toc = render_toc(&[entry(1, "a"), entry(2, "b")]);
        assert!(toc.ends_with("<a href=\"#b\">B</a></li></ul>\n</ul>"));
    }

    #[test]
    fn test_toc_never_closes_below_first_level() {
        let toc = render_toc(&[entry(2, "a"), entry(1, "b"), entry(2, "c")]);
        assert_eq!(toc.matches("<ul").count(), toc.matches("</ul>").count());
        assert_eq!(toc.matches("<ul class=\"toc-sub\">").count(), 0);
        assert!(toc.starts_with("<ul class=\"toc-list\">\n"));
        assert!(toc.ends_with("\n</ul>"));
    }
}
