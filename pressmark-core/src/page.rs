//! Article page composition and output naming.

use std::path::{Component, Path};

/// Everything substituted into the page template for one document
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub title: &'a str,
    pub date: &'a str,
    pub category: &'a str,
    pub toc_html: &'a str,
    pub content_html: &'a str,
}

/// Fills the article template.
///
/// Holds the read-once template and stylesheets for the whole build.
/// Values are inserted verbatim: documents are trusted input and no
/// escaping is applied to title, date or category.
#[derive(Debug, Clone, Default)]
pub struct PageComposer {
    template: String,
    site_css: String,
    article_css: String,
    highlight_css_href: Option<String>,
}

impl PageComposer {
    pub fn new(
        template: impl Into<String>,
        site_css: impl Into<String>,
        article_css: impl Into<String>,
        highlight_css_href: Option<String>,
    ) -> Self {
        Self {
            template: template.into(),
            site_css: site_css.into(),
            article_css: article_css.into(),
            highlight_css_href,
        }
    }

    pub fn compose(&self, page: &PageContext<'_>) -> String {
        let category_suffix = if page.category.is_empty() {
            String::new()
        } else {
            format!(" · {}", page.category)
        };
        let highlight_link = self
            .highlight_css_href
            .as_deref()
            .map(|href| format!("<link rel=\"stylesheet\" href=\"{}\">", href))
            .unwrap_or_default();

        // Content goes last so placeholder-looking text inside it survives
        self.template
            .replace("{{INDEX_CSS}}", &self.site_css)
            .replace("{{ARTICLE_CSS}}", &self.article_css)
            .replace("{{HL_CSS_LINK}}", &highlight_link)
            .replace("{{TITLE}}", page.title)
            .replace("{{DATE}}", page.date)
            .replace("{{CATEGORY_SUFFIX}}", &category_suffix)
            .replace("{{TOC}}", page.toc_html)
            .replace("{{CONTENT}}", page.content_html)
    }
}

/// Flat output file name for a source path relative to the source root.
///
/// Directory components and the file stem are joined with hyphens:
/// `notes/2024/post.md` → `notes-2024-post.html`.
///
/// ```
/// use pressmark_core::page::output_file_name;
/// use std::path::Path;
///
/// assert_eq!(output_file_name(Path::new("notes/2024/post.md")), "notes-2024-post.html");
/// assert_eq!(output_file_name(Path::new("hello.md")), "hello.html");
/// ```
pub fn output_file_name(rel_path: &Path) -> String {
    let mut parts: Vec<String> = rel_path
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter_map(|c| match c {
                    Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    let stem = rel_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    parts.push(stem);

    format!("{}.html", parts.join("-"))
}

/// `/`-joined form of a relative path, for URLs and the JSON index
pub fn web_path(rel_path: &Path) -> String {
    rel_path
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "<style>{{INDEX_CSS}}</style><style>{{ARTICLE_CSS}}</style>{{HL_CSS_LINK}}\
<title>{{TITLE}}</title><h1>{{TITLE}}</h1><time>{{DATE}}</time>{{CATEGORY_SUFFIX}}\
<nav>{{TOC}}</nav><main>{{CONTENT}}</main>";

    fn context<'a>(title: &'a str, category: &'a str, content: &'a str) -> PageContext<'a> {
        PageContext {
            title,
            date: "2024-06-01",
            category,
            toc_html: "<ul></ul>",
            content_html: content,
        }
    }

    #[test]
    fn test_all_placeholders_replaced() {
        let composer = PageComposer::new(
            TEMPLATE,
            "body{}",
            "article{}",
            Some("./highlight/syntect.css".to_string()),
        );
        let page = composer.compose(&context("Hello", "rust", "<p>Hi</p>"));

        assert_eq!(
            page,
            "<style>body{}</style><style>article{}</style>\
<link rel=\"stylesheet\" href=\"./highlight/syntect.css\">\
<title>Hello</title><h1>Hello</h1><time>2024-06-01</time> · rust\
<nav><ul></ul></nav><main><p>Hi</p></main>"
        );
    }

    #[test]
    fn test_missing_optional_parts_render_empty() {
        let composer = PageComposer::new(TEMPLATE, "", "", None);
        let page = composer.compose(&context("T", "", ""));
        assert!(page.starts_with("<style></style><style></style><title>T</title>"));
        assert!(page.contains("</time><nav>"));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn test_title_is_not_escaped() {
        let composer = PageComposer::new("{{TITLE}}", "", "", None);
        let page = composer.compose(&context("<b>Bold</b> & co", "", ""));
        assert_eq!(page, "<b>Bold</b> & co");
    }

    #[test]
    fn test_content_placeholders_survive() {
        let composer = PageComposer::new("{{CONTENT}}|{{TITLE}}", "", "", None);
        let page = composer.compose(&context("T", "", "use {{TITLE}} in templates"));
        assert_eq!(page, "use {{TITLE}} in templates|T");
    }

    #[test]
    fn test_empty_template_yields_empty_page() {
        let composer = PageComposer::default();
        assert_eq!(composer.compose(&context("T", "c", "x")), "");
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name(Path::new("a/b/c.md")), "a-b-c.html");
        assert_eq!(output_file_name(Path::new("Notes.MD")), "Notes.html");
        assert_eq!(output_file_name(Path::new("v1.2/post.md")), "v1.2-post.html");
    }

    #[test]
    fn test_web_path() {
        assert_eq!(web_path(Path::new("a/b/c.md")), "a/b/c.md");
        assert_eq!(web_path(Path::new("c.md")), "c.md");
    }
}
