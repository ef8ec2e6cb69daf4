//! Site building logic - orchestrates parsing, rendering, and output.

use crate::{
    assets::SiteAssets,
    config::Config,
    derive::derive,
    index::{sort_summaries, to_json, IndexComposer},
    markdown::MarkdownRenderer,
    metadata::extract,
    models::{Document, Metadata, PostSummary},
    page::{output_file_name, web_path, PageComposer, PageContext},
    toc::anchorize,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Source directory not found: {0:?}")]
    SourceMissing(PathBuf),

    #[error("Failed to scan source tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize index: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Outcome of a full build
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Published entries, newest first
    pub summaries: Vec<PostSummary>,
    pub skipped_private: usize,
    pub output_dir: PathBuf,
}

/// Main site builder
pub struct SiteBuilder {
    config: Config,
    renderer: MarkdownRenderer,
}

impl SiteBuilder {
    pub fn new(config: Config) -> Self {
        Self::with_renderer(config, MarkdownRenderer::new())
    }

    pub fn with_renderer(config: Config, renderer: MarkdownRenderer) -> Self {
        Self { config, renderer }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a full build. Re-running with unchanged inputs reproduces the
    /// same output.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let source_dir = self.config.source_dir();
        let output_dir = self.config.output_dir();
        let posts_dir = self.config.posts_output_dir();

        if !source_dir.is_dir() {
            return Err(BuildError::SourceMissing(source_dir));
        }

        self.clean_output()?;
        create_dir(&posts_dir)?;

        let assets = SiteAssets::load(&self.config);

        let highlight_href = match &assets.highlight {
            Some(stylesheet) => {
                let dir = posts_dir.join("highlight");
                create_dir(&dir)?;
                write_file(&dir.join(&stylesheet.file_name), &stylesheet.css)?;
                Some(format!("./highlight/{}", stylesheet.file_name))
            }
            None => None,
        };

        let page_composer = PageComposer::new(
            assets.page_template.as_str(),
            assets.site_css.clone().unwrap_or_default(),
            assets.article_css.as_str(),
            highlight_href,
        );

        let markdown_files = self.discover_markdown_files()?;
        tracing::info!("Found {} markdown files", markdown_files.len());

        let source_prefix = self.config.source_web_prefix();
        let mut summaries = Vec::new();
        let mut skipped_private = 0;

        for rel_path in &markdown_files {
            let abs_path = source_dir.join(rel_path);
            let (raw, modified) = read_source(&abs_path)?;

            let Some(doc) = process_document(&self.renderer, rel_path, &raw, modified)
            else {
                tracing::debug!("Skipping private document {:?}", rel_path);
                skipped_private += 1;
                continue;
            };

            let flat_name = output_file_name(rel_path);
            let page = page_composer.compose(&PageContext {
                title: &doc.title,
                date: &doc.date,
                category: &doc.category,
                toc_html: &doc.toc_html,
                content_html: &doc.content_html,
            });
            write_file(&posts_dir.join(&flat_name), &page)?;
            tracing::debug!("Rendered {} -> {}", doc.rel_path, flat_name);

            summaries.push(doc.to_summary(
                join_web(&self.config.posts_dir, &flat_name),
                join_web(&source_prefix, &doc.rel_path),
            ));
        }

        sort_summaries(&mut summaries);
        write_file(&self.config.index_json_path(), &to_json(&summaries)?)?;

        let index_composer = IndexComposer::new(
            assets.index_template.as_str(),
            assets.site_css.clone(),
            self.config.index_json.as_str(),
        );
        let index_html = index_composer.compose(&summaries, &assets.programs);
        write_file(&output_dir.join("index.html"), &index_html)?;

        self.copy_assets(&output_dir);

        tracing::info!("✓ Built {} pages", summaries.len());
        if skipped_private > 0 {
            tracing::info!("Skipped {} private documents", skipped_private);
        }
        tracing::info!("✓ Output written to {:?}", output_dir);

        Ok(BuildReport {
            summaries,
            skipped_private,
            output_dir,
        })
    }

    /// Markdown files under the source root, relative, in depth-first
    /// name order
    pub fn discover_markdown_files(&self) -> Result<Vec<PathBuf>, BuildError> {
        let source_dir = self.config.source_dir();
        if !source_dir.is_dir() {
            return Err(BuildError::SourceMissing(source_dir));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&source_dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&source_dir)
                .unwrap_or(entry.path())
                .to_path_buf();
            files.push(rel);
        }

        Ok(files)
    }

    /// Remove pages and the index from a previous build
    fn clean_output(&self) -> Result<(), BuildError> {
        let posts_dir = self.config.posts_output_dir();
        if posts_dir.exists() {
            fs::remove_dir_all(&posts_dir).map_err(|source| BuildError::Write {
                path: posts_dir.clone(),
                source,
            })?;
        }

        let index_json = self.config.index_json_path();
        if index_json.exists() {
            fs::remove_file(&index_json).map_err(|source| BuildError::Write {
                path: index_json.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Copy configured static files; the first existing candidate wins
    fn copy_assets(&self, output_dir: &Path) {
        let roots = [self.config.site_root(), self.config.templates_dir()];

        for asset in &self.config.assets {
            let Some(file_name) = asset.file_name() else {
                continue;
            };
            let Some(source) = roots.iter().map(|r| r.join(asset)).find(|p| p.is_file()) else {
                tracing::debug!("Asset {:?} not found, skipping", asset);
                continue;
            };

            let target = output_dir.join(file_name);
            match fs::copy(&source, &target) {
                Ok(_) => tracing::debug!("Copied {:?}", source),
                Err(err) => tracing::warn!("Failed to copy {:?}: {}", source, err),
            }
        }
    }
}

/// Run the per-document pipeline on raw text.
///
/// Returns `None` for private documents.
pub fn process_document(
    renderer: &MarkdownRenderer,
    rel_path: &Path,
    raw: &str,
    modified: SystemTime,
) -> Option<Document> {
    let extracted = extract(raw);
    if extracted.metadata.is_private() {
        return None;
    }

    Some(render_document(
        renderer,
        rel_path,
        extracted.content,
        extracted.metadata,
        modified,
    ))
}

/// Render an already split body and metadata into a document
pub fn render_document(
    renderer: &MarkdownRenderer,
    rel_path: &Path,
    body: String,
    metadata: Metadata,
    modified: SystemTime,
) -> Document {
    let derived = derive(&body, &metadata, rel_path, modified);
    let fragment = renderer.render_body(&body, &derived.title);
    let anchored = anchorize(&fragment);

    Document {
        rel_path: web_path(rel_path),
        body,
        metadata,
        title: derived.title,
        summary: derived.summary,
        date: derived.date,
        category: derived.category,
        content_html: anchored.html,
        toc: anchored.headings,
        toc_html: anchored.toc_html,
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

fn join_web(prefix: &str, rest: &str) -> String {
    if prefix.is_empty() {
        rest.to_string()
    } else {
        format!("{}/{}", prefix.trim_end_matches('/'), rest)
    }
}

fn read_source(path: &Path) -> Result<(String, SystemTime), BuildError> {
    let read_err = |source| BuildError::Read {
        path: path.to_path_buf(),
        source,
    };
    let bytes = fs::read(path).map_err(read_err)?;
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(read_err)?;
    Ok((String::from_utf8_lossy(&bytes).into_owned(), modified))
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), BuildError> {
    fs::write(path, contents).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}
