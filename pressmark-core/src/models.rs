//! Content model structs for documents, headings, and the site index.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Merged metadata from the comment block and front matter.
///
/// Keys are stored lowercased. Empty values read as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    entries: BTreeMap<String, String>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, normalizing the key to lowercase
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.trim().to_lowercase(), value.into());
    }

    /// Lookup by key (case-insensitive), ignoring empty values
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_lowercase())
            .map(|v| v.as_str())
            .filter(|v| !v.trim().is_empty())
    }

    /// Overlay `other` on top of `self`; keys in `other` win.
    pub fn overlay(mut self, other: Metadata) -> Metadata {
        self.entries.extend(other.entries);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    pub fn summary(&self) -> Option<&str> {
        self.get("summary")
    }

    pub fn date(&self) -> Option<&str> {
        self.get("date")
    }

    pub fn category(&self) -> Option<&str> {
        self.get("category")
    }

    /// Whether the document opted out of publishing
    pub fn is_private(&self) -> bool {
        self.get("private")
            .map(|v| {
                matches!(
                    v.trim().to_lowercase().as_str(),
                    "true" | "yes" | "on" | "1"
                )
            })
            .unwrap_or(false)
    }
}

/// A heading picked up while anchoring a rendered fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingEntry {
    /// 1 to 3
    pub level: u8,
    pub slug: String,
    /// Inner heading text with markup stripped (entities kept)
    pub text: String,
}

/// One markdown source unit, alive for a single build pass
#[derive(Debug, Clone)]
pub struct Document {
    /// Path relative to the source root, `/`-separated
    pub rel_path: String,

    /// Body text with metadata blocks removed
    pub body: String,

    pub metadata: Metadata,

    pub title: String,
    pub summary: String,
    pub date: String,
    pub category: String,

    /// Rendered and anchored HTML fragment
    pub content_html: String,

    pub toc: Vec<HeadingEntry>,
    pub toc_html: String,
}

impl Document {
    pub fn to_summary(&self, path: String, origin_path: String) -> PostSummary {
        PostSummary {
            title: self.title.clone(),
            summary: self.summary.clone(),
            date: self.date.clone(),
            category: self.category.clone(),
            path,
            origin_path,
        }
    }
}

/// Index entry describing one published document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub title: String,
    pub summary: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub category: String,
    /// Output page path relative to the site root
    pub path: String,
    /// Source path relative to the site root
    pub origin_path: String,
}

/// External link listed on the index page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub link: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,
}
