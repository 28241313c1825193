// src/site/mod.rs
// =============================================================================
// The end-to-end build.
//
// What happens here:
// 1. Load the template and the config document (nothing is touched on
//    disk if either is broken)
// 2. Wipe the output directory and copy the static assets into it
// 3. Resolve the redirect table (config + hosting APIs)
// 4. Write redirects.json, the index consumed by the search page
// 5. Render one page per name, several at a time
//
// A hosting API failure stops the build in step 3, before an index is
// written. Page failures are collected and reported together at the end.
// =============================================================================

mod output;
mod resolve;

pub use resolve::resolve_table;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::load_config;
use crate::fetch::Fetcher;
use crate::hosts::HostSettings;
use crate::page::{PageRenderer, Template};

/// Everything a build needs besides the HTTP handle
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub config_path: PathBuf,
    pub assets_dir: PathBuf,
    pub template_path: PathBuf,
    pub output_dir: PathBuf,
    /// Pages rendered at once
    pub jobs: usize,
    /// Scrape target pages for title/description/image
    pub scrape: bool,
    pub hosts: HostSettings,
}

/// What a successful build produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub assets: usize,
    pub pages: usize,
    pub index_path: PathBuf,
}

pub fn load_template(path: &Path) -> Result<Template> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read template {}", path.display()))?;
    let template = Template::parse(&source)
        .with_context(|| format!("Invalid template {}", path.display()))?;
    Ok(template)
}

pub async fn build(options: &BuildOptions, fetcher: &Fetcher) -> Result<BuildReport> {
    let template = load_template(&options.template_path)?;
    let config = load_config(&options.config_path)?;
    output::check_output_dir(&options.output_dir, &options.assets_dir)?;

    output::prepare_output_dir(&options.output_dir)?;
    let assets = output::copy_assets(
        &options.assets_dir,
        &options.output_dir,
        &options.template_path,
    )?;
    tracing::info!(assets, output = %options.output_dir.display(), "copied static assets");

    let table = resolve_table(&config, fetcher, &options.hosts)
        .await
        .context("Failed to resolve redirect table")?;
    if table.is_empty() {
        tracing::warn!("redirect table is empty, no pages will be generated");
    }

    let index_path = output::write_index(&options.output_dir, &table)?;
    tracing::info!(entries = table.len(), path = %index_path.display(), "wrote redirect index");

    let renderer = PageRenderer::new(template, fetcher.clone(), &options.output_dir)
        .with_ref_tag(config.ref_tag.clone())
        .with_scraping(options.scrape);
    let outcomes = renderer
        .write_all(table.entries().collect(), options.jobs)
        .await;

    let total = outcomes.len();
    let mut failed = 0;
    for outcome in &outcomes {
        if let Err(e) = &outcome.result {
            tracing::error!(name = %outcome.name, error = %e, "failed to write page");
            failed += 1;
        }
    }
    if failed > 0 {
        anyhow::bail!("{} of {} pages could not be written", failed, total);
    }

    Ok(BuildReport {
        assets,
        pages: total,
        index_path,
    })
}

/// Loads the config and resolves the table without writing anything
pub async fn resolve(
    config_path: &Path,
    fetcher: &Fetcher,
    hosts: &HostSettings,
) -> Result<crate::table::RedirectTable> {
    let config = load_config(config_path)?;
    let table = resolve_table(&config, fetcher, hosts)
        .await
        .context("Failed to resolve redirect table")?;
    Ok(table)
}
