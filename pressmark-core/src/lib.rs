//! # pressmark-core
//!
//! Core library for the pressmark static site generator.
//!
//! Turns a tree of markdown documents into standalone article pages, a
//! JSON index and an index page.

pub mod assets;
pub mod builder;
pub mod config;
pub mod derive;
pub mod index;
pub mod markdown;
pub mod metadata;
pub mod models;
pub mod page;
pub mod slug;
pub mod toc;

pub use builder::{process_document, render_document, BuildError, BuildReport, SiteBuilder};
pub use config::{Config, ConfigError};
pub use markdown::MarkdownRenderer;
pub use models::{Document, HeadingEntry, Metadata, PostSummary, Program};
pub use slug::slugify;
