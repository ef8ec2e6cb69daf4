//! Title, summary, date, and category derivation for documents whose
//! metadata leaves them out.

use crate::models::Metadata;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use std::time::SystemTime;

/// Maximum summary length, in characters, including the ellipsis
pub const SUMMARY_MAX_CHARS: usize = 140;

/// Category used when neither metadata nor the source tree provides one
pub const FALLBACK_CATEGORY: &str = "uncategorized";

static FIRST_HEADING_REGEX: OnceLock<Regex> = OnceLock::new();
static CODE_FENCE_REGEX: OnceLock<Regex> = OnceLock::new();
static LEADING_FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();
static HEADING_LINE_REGEX: OnceLock<Regex> = OnceLock::new();
static PARAGRAPH_SPLIT_REGEX: OnceLock<Regex> = OnceLock::new();

fn first_heading_regex() -> &'static Regex {
    FIRST_HEADING_REGEX.get_or_init(|| Regex::new(r"(?m)^[ \t]*#[ \t]+(.+?)\r?$").unwrap())
}

fn code_fence_regex() -> &'static Regex {
    CODE_FENCE_REGEX.get_or_init(|| Regex::new(r"(?s)```.*?```").unwrap())
}

fn leading_frontmatter_regex() -> &'static Regex {
    LEADING_FRONTMATTER_REGEX.get_or_init(|| Regex::new(r"(?s)\A\s*---.*?---\s*").unwrap())
}

fn heading_line_regex() -> &'static Regex {
    HEADING_LINE_REGEX.get_or_init(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+.*$").unwrap())
}

fn paragraph_split_regex() -> &'static Regex {
    PARAGRAPH_SPLIT_REGEX.get_or_init(|| Regex::new(r"\n\s*\n").unwrap())
}

/// Effective display fields for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derived {
    pub title: String,
    pub summary: String,
    pub date: String,
    pub category: String,
}

/// Derive the display fields for a document.
///
/// `rel_path` is the source path relative to the source root; `modified`
/// is the file's modification time, used when the metadata has no date.
pub fn derive(body: &str, metadata: &Metadata, rel_path: &Path, modified: SystemTime) -> Derived {
    Derived {
        title: derive_title(body, metadata, rel_path),
        summary: metadata
            .summary()
            .map(str::to_string)
            .unwrap_or_else(|| extract_summary(body)),
        date: derive_date(metadata, modified),
        category: derive_category(metadata, rel_path),
    }
}

/// Metadata title, else the first `# ` heading, else the file stem
pub fn derive_title(body: &str, metadata: &Metadata, rel_path: &Path) -> String {
    if let Some(title) = metadata.title() {
        return title.to_string();
    }

    let from_heading = first_heading(body);
    if !from_heading.is_empty() {
        return from_heading;
    }

    rel_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Text of the first level-1 ATX heading, or empty
pub fn first_heading(markdown: &str) -> String {
    first_heading_regex()
        .captures(markdown)
        .map(|c| c[1].trim_start_matches('#').trim().to_string())
        .unwrap_or_default()
}

/// First prose paragraph, trimmed to [`SUMMARY_MAX_CHARS`].
///
/// Fenced code, a leading front-matter-shaped block and heading lines are
/// skipped.
pub fn extract_summary(markdown: &str) -> String {
    let without_code = code_fence_regex().replace_all(markdown, "");
    let without_frontmatter = leading_frontmatter_regex().replace(&without_code, "");
    let without_headings = heading_line_regex().replace_all(&without_frontmatter, "");
    let normalized = without_headings.replace("\r\n", "\n");

    let text = paragraph_split_regex()
        .split(&normalized)
        .map(|p| p.replace('\n', " ").trim().to_string())
        .find(|p| !p.is_empty())
        .unwrap_or_default();

    truncate(&text, SUMMARY_MAX_CHARS)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/// Metadata date with dots normalized to hyphens, else the mtime as UTC `YYYY-MM-DD`
pub fn derive_date(metadata: &Metadata, modified: SystemTime) -> String {
    match metadata.date() {
        Some(date) => date.trim().replace('.', "-"),
        None => DateTime::<Utc>::from(modified).format("%Y-%m-%d").to_string(),
    }
}

/// Metadata category, else the immediate parent directory, else [`FALLBACK_CATEGORY`]
pub fn derive_category(metadata: &Metadata, rel_path: &Path) -> String {
    if let Some(category) = metadata.category() {
        return category.to_string();
    }

    rel_path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_CATEGORY)
        .to_string()
}
