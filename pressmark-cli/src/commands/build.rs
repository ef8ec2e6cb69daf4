//! Build command implementation.

use anyhow::{Context, Result};
use pressmark_core::{BuildReport, Config, SiteBuilder};
use std::path::Path;

/// Build the static site from the config at `config_path`
pub fn build_site(config_path: &Path) -> Result<BuildReport> {
    tracing::info!("Loading config from {:?}", config_path);
    let config = Config::load(config_path).context("Failed to load configuration")?;
    build_site_with_config(config)
}

/// Build the site from an already loaded config
pub fn build_site_with_config(config: Config) -> Result<BuildReport> {
    tracing::info!("Building site from {:?}", config.source_dir());

    let report = SiteBuilder::new(config)
        .build()
        .context("Failed to build site")?;

    println!(
        "✓ Built {} pages into {:?}",
        report.summaries.len(),
        report.output_dir
    );
    Ok(report)
}
