//! Slug generation for heading anchors.

use regex::Regex;
use std::sync::OnceLock;

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static ENTITY_REGEX: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();
static HYPHENS_REGEX: OnceLock<Regex> = OnceLock::new();

pub(crate) fn tag_regex() -> &'static Regex {
    TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

fn entity_regex() -> &'static Regex {
    ENTITY_REGEX.get_or_init(|| Regex::new(r"&[^;]+;?").unwrap())
}

fn whitespace_regex() -> &'static Regex {
    WHITESPACE_REGEX.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn hyphens_regex() -> &'static Regex {
    HYPHENS_REGEX.get_or_init(|| Regex::new(r"-+").unwrap())
}

/// CJK unified ideographs accepted in slugs
fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// Convert heading text to a URL-safe slug
///
/// Rules, in order:
/// - Trim and lowercase
/// - Drop HTML tags and entity references
/// - Keep only `a-z`, `0-9`, CJK ideographs, hyphens and whitespace
/// - Whitespace runs become a single hyphen
/// - Collapse repeated hyphens, trim hyphens at both ends
///
/// May return an empty string; callers pick a fallback.
///
/// # Examples
///
/// ```
/// use pressmark_core::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("Rust &amp; Safety"), "rust-safety");
/// assert_eq!(slugify("安装 Guide"), "安装-guide");
/// assert_eq!(slugify("!!!"), "");
/// ```
pub fn slugify(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let no_tags = tag_regex().replace_all(&lowered, "");
    let no_entities = entity_regex().replace_all(&no_tags, "");

    let kept: String = no_entities
        .chars()
        .filter(|&c| {
            c.is_ascii_lowercase()
                || c.is_ascii_digit()
                || c == '-'
                || c.is_whitespace()
                || is_cjk_ideograph(c)
        })
        .collect();

    let hyphenated = whitespace_regex().replace_all(&kept, "-");
    let collapsed = hyphens_regex().replace_all(&hyphenated, "-");

    collapsed.trim_matches('-').to_string()
}
