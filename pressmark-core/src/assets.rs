//! Read-once site assets: templates, stylesheets, highlighting CSS and the
//! programs list.

use crate::config::{
    Config, ARTICLE_CSS_FILE, INDEX_TEMPLATE_FILE, PAGE_TEMPLATE_FILE, PROGRAMS_FILE,
    SITE_CSS_FILE,
};
use crate::markdown::highlight_css;
use crate::models::Program;
use std::fs;
use std::path::Path;

/// Highlighting stylesheet and the file name it is published under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightStylesheet {
    pub file_name: String,
    pub css: String,
}

/// Shared inputs of one build. Missing files load as `None` or empty.
#[derive(Debug, Clone, Default)]
pub struct SiteAssets {
    pub page_template: String,
    pub index_template: String,
    pub site_css: Option<String>,
    pub article_css: String,
    pub highlight: Option<HighlightStylesheet>,
    pub programs: Vec<Program>,
}

impl SiteAssets {
    pub fn load(config: &Config) -> Self {
        let page_template = read_optional(&config.template_file(PAGE_TEMPLATE_FILE));
        let index_template = read_optional(&config.template_file(INDEX_TEMPLATE_FILE));

        if page_template.is_none() {
            tracing::warn!("No page template found; article pages will be empty");
        }
        if index_template.is_none() {
            tracing::warn!("No index template found; index.html will be empty");
        }

        Self {
            page_template: page_template.unwrap_or_default(),
            index_template: index_template.unwrap_or_default(),
            site_css: read_optional(&config.template_file(SITE_CSS_FILE)),
            article_css: read_optional(&config.template_file(ARTICLE_CSS_FILE)).unwrap_or_default(),
            highlight: load_highlight(config),
            programs: load_programs(&config.template_file(PROGRAMS_FILE)),
        }
    }
}

/// Read a text file, treating any failure as absence
pub fn read_optional(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(err) => {
            tracing::debug!("Optional asset {:?} unavailable: {}", path, err);
            None
        }
    }
}

fn load_highlight(config: &Config) -> Option<HighlightStylesheet> {
    let vendor = config.vendor_highlight_css();
    if let Some(css) = read_optional(&vendor) {
        return Some(HighlightStylesheet {
            file_name: "github.min.css".to_string(),
            css,
        });
    }

    highlight_css(&config.highlight_theme).map(|css| HighlightStylesheet {
        file_name: "syntect.css".to_string(),
        css,
    })
}

/// Parse programs.json; a missing or malformed file yields an empty list
pub fn load_programs(path: &Path) -> Vec<Program> {
    let Some(raw) = read_optional(path) else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<Program>>(&raw) {
        Ok(programs) => programs,
        Err(err) => {
            tracing::warn!("Ignoring malformed {:?}: {}", path, err);
            Vec::new()
        }
    }
}
