//! Metadata extraction from leading comment blocks and front matter.

use crate::models::Metadata;
use regex::Regex;
use std::sync::OnceLock;

static COMMENT_LINE_REGEX: OnceLock<Regex> = OnceLock::new();
static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();
static FRONTMATTER_LINE_REGEX: OnceLock<Regex> = OnceLock::new();

fn comment_line_regex() -> &'static Regex {
    COMMENT_LINE_REGEX
        .get_or_init(|| Regex::new(r"^<!--\s*([^:：]+?)\s*[:：]\s*(.*?)\s*-->$").unwrap())
}

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| {
        Regex::new(r"(?s)\A---[ \t]*\r?\n(.*?)\r?\n---[ \t]*(?:\r?\n|\z)").unwrap()
    })
}

fn frontmatter_line_regex() -> &'static Regex {
    FRONTMATTER_LINE_REGEX
        .get_or_init(|| Regex::new(r"^([A-Za-z0-9_\-]+):\s*(.*)$").unwrap())
}

/// Result of splitting a raw document into metadata and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub content: String,
    pub metadata: Metadata,
}

/// Extract comment-block and front-matter metadata from a raw document.
///
/// Comment-block values win over front-matter values for the same key.
///
/// # Example
///
/// ```
/// use pressmark_core::metadata::extract;
///
/// let raw = "<!-- title: From Comment -->\n---\ntitle: From Front Matter\ndate: 2024.06.01\n---\nBody";
/// let extracted = extract(raw);
/// assert_eq!(extracted.metadata.title(), Some("From Comment"));
/// assert_eq!(extracted.metadata.date(), Some("2024.06.01"));
/// assert_eq!(extracted.content, "Body");
/// ```
pub fn extract(raw: &str) -> Extracted {
    let (after_comments, comment_meta) = parse_comment_block(raw);
    let (content, frontmatter_meta) = parse_frontmatter(&after_comments);

    Extracted {
        content,
        metadata: frontmatter_meta.overlay(comment_meta),
    }
}

/// Parse a leading run of `<!-- key: value -->` lines.
///
/// Blank lines inside or after the run are consumed with it. When no
/// comment line matches, the input comes back untouched.
pub fn parse_comment_block(markdown: &str) -> (String, Metadata) {
    let lines: Vec<&str> = markdown.split('\n').collect();
    let mut metadata = Metadata::new();
    let mut end_index = 0;

    for (i, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            end_index = i + 1;
            continue;
        }

        let Some(captures) = comment_line_regex().captures(line) else {
            break;
        };
        metadata.insert(&captures[1], captures[2].trim());
        end_index = i + 1;
    }

    if metadata.is_empty() {
        return (markdown.to_string(), metadata);
    }

    let content = lines.get(end_index..).unwrap_or_default().join("\n");
    (content, metadata)
}

/// Parse a `---` delimited block of `key: value` lines at the very start.
///
/// Lines that are not `key: value` pairs are skipped.
pub fn parse_frontmatter(markdown: &str) -> (String, Metadata) {
    let Some(captures) = frontmatter_regex().captures(markdown) else {
        return (markdown.to_string(), Metadata::new());
    };

    let mut metadata = Metadata::new();
    for line in captures[1].lines() {
        match frontmatter_line_regex().captures(line.trim_end()) {
            Some(kv) => metadata.insert(&kv[1], strip_quotes(kv[2].trim())),
            None => tracing::trace!("Skipping front matter line: {:?}", line),
        }
    }

    let rest = markdown[captures[0].len()..].to_string();
    (rest, metadata)
}

/// Strip one pair of surrounding single or double quotes
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_metadata_is_noop() {
        let raw = "# Title\n\nBody text.";
        let extracted = extract(raw);
        assert!(extracted.metadata.is_empty());
        assert_eq!(extracted.content, raw);
    }

    #[test]
    fn test_comment_block_basic() {
        let raw = "<!-- title: Hello -->\n<!-- Date: 2024-01-01 -->\n# Heading\n";
        let extracted = extract(raw);
        assert_eq!(extracted.metadata.title(), Some("Hello"));
        assert_eq!(extracted.metadata.date(), Some("2024-01-01"));
        assert_eq!(extracted.content, "# Heading\n");
    }

    #[test]
    fn test_comment_block_full_width_colon() {
        let raw = "<!-- category：随笔 -->\nBody";
        let extracted = extract(raw);
        assert_eq!(extracted.metadata.category(), Some("随笔"));
        assert_eq!(extracted.content, "Body");
    }

    #[test]
    fn test_comment_block_tolerates_blank_lines() {
        let raw = "\n<!-- title: A -->\n\n<!-- summary: B -->\n\nBody\n";
        let extracted = extract(raw);
        assert_eq!(extracted.metadata.title(), Some("A"));
        assert_eq!(extracted.metadata.summary(), Some("B"));
        assert_eq!(extracted.content, "Body\n");
    }

    #[test]
    fn test_comment_scan_stops_at_first_non_matching_line() {
        let raw = "<!-- title: A -->\nText\n<!-- summary: B -->\n";
        let extracted = extract(raw);
        assert_eq!(extracted.metadata.title(), Some("A"));
        assert_eq!(extracted.metadata.summary(), None);
        assert_eq!(extracted.content, "Text\n<!-- summary: B -->\n");
    }

    #[test]
    fn test_plain_comment_without_colon_is_not_metadata() {
        let raw = "<!-- just a note -->\nBody";
        let extracted = extract(raw);
        assert!(extracted.metadata.is_empty());
        assert_eq!(extracted.content, raw);
    }

    #[test]
    fn test_frontmatter_basic() {
        let raw = "---\ntitle: \"Quoted Title\"\ncategory: 'rust'\nprivate: false\n---\n# Body\n";
        let extracted = extract(raw);
        assert_eq!(extracted.metadata.title(), Some("Quoted Title"));
        assert_eq!(extracted.metadata.category(), Some("rust"));
        assert!(!extracted.metadata.is_private());
        assert_eq!(extracted.content, "# Body\n");
    }

    #[test]
    fn test_frontmatter_keys_lowercased() {
        let raw = "---\nTitle: Upper\n---\nBody";
        let extracted = extract(raw);
        assert_eq!(extracted.metadata.title(), Some("Upper"));
    }

    #[test]
    fn test_frontmatter_skips_malformed_lines() {
        let raw = "---\ntitle: Ok\nthis line is junk\n  - list item\n: no key\n---\nBody";
        let extracted = extract(raw);
        assert_eq!(extracted.metadata.title(), Some("Ok"));
        assert_eq!(extracted.metadata.len(), 1);
        assert_eq!(extracted.content, "Body");
    }

    #[test]
    fn test_frontmatter_only_at_start() {
        let raw = "Intro\n\n---\ntitle: Late\n---\n";
        let extracted = extract(raw);
        assert!(extracted.metadata.is_empty());
        assert_eq!(extracted.content, raw);
    }

    #[test]
    fn test_unclosed_frontmatter_is_body() {
        let raw = "---\ntitle: Never closed\n\nBody";
        let extracted = extract(raw);
        assert!(extracted.metadata.is_empty());
        assert_eq!(extracted.content, raw);
    }

    #[test]
    fn test_frontmatter_crlf() {
        let raw = "---\r\ntitle: Windows\r\n---\r\nBody";
        let extracted = extract(raw);
        assert_eq!(extracted.metadata.title(), Some("Windows"));
        assert_eq!(extracted.content, "Body");
    }

    #[test]
    fn test_comment_block_overrides_frontmatter() {
        let raw = "<!-- title: Comment Title -->\n---\ntitle: FM Title\nsummary: FM Summary\n---\nBody";
        let extracted = extract(raw);
        assert_eq!(extracted.metadata.title(), Some("Comment Title"));
        assert_eq!(extracted.metadata.summary(), Some("FM Summary"));
        assert_eq!(extracted.content, "Body");
    }

    #[test]
    fn test_private_from_comment_block() {
        let extracted = extract("<!-- private: true -->\nSecret");
        assert!(extracted.metadata.is_private());
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"a\""), "a");
        assert_eq!(strip_quotes("'a'"), "a");
        assert_eq!(strip_quotes("\"a'"), "\"a'");
        assert_eq!(strip_quotes("\""), "\"");
        assert_eq!(strip_quotes("plain"), "plain");
    }
}
