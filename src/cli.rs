// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - build: generate the whole site (pages + redirects.json)
// - list: resolve the redirect table and print it, nothing is written
//
// Flags that carry secrets or deployment-specific URLs can also come from
// the environment (or a .env file loaded before parsing), so CI can set
// CURSE_KEY without putting it on the command line.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::hosts::{HostSettings, CURSEFORGE_API, MODRINTH_API};

#[derive(Parser, Debug)]
#[command(
    name = "redirect-pages",
    version,
    about = "Builds static HTML redirect pages for short link names",
    long_about = "redirect-pages turns a JSON mapping of short names to URLs (plus the projects \
                  an author publishes on CurseForge and Modrinth) into one HTML redirect page \
                  per name and a redirects.json index."
)]
pub struct Cli {
    /// Log debug output for this tool (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the redirect site
    ///
    /// Example: redirect-pages build --config redirects.json --output dist
    Build(BuildArgs),

    /// Resolve and print the redirect table without writing anything
    ///
    /// Example: redirect-pages list --json
    List {
        #[command(flatten)]
        source: SourceArgs,

        /// Output the table as JSON instead of a text table
        #[arg(long)]
        json: bool,
    },
}

/// Where redirects come from
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Redirect configuration document
    #[arg(long, default_value = "redirects.json")]
    pub config: PathBuf,

    /// CurseForge API key, required when the config names a curseforge author
    #[arg(long, env = "CURSE_KEY", hide_env_values = true)]
    pub curse_key: Option<String>,

    /// CurseForge API base URL
    #[arg(long, env = "CURSEFORGE_API_URL", default_value = CURSEFORGE_API, hide = true)]
    pub curseforge_api: String,

    /// Modrinth API base URL
    #[arg(long, env = "MODRINTH_API_URL", default_value = MODRINTH_API, hide = true)]
    pub modrinth_api: String,
}

impl SourceArgs {
    pub fn host_settings(&self) -> HostSettings {
        HostSettings {
            curseforge_api: self.curseforge_api.clone(),
            modrinth_api: self.modrinth_api.clone(),
            curse_key: self.curse_key.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Static assets copied into the output unchanged
    #[arg(long, default_value = "static")]
    pub assets: PathBuf,

    /// Page template (default: <assets>/template.html)
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Output directory; removed and recreated on every build
    #[arg(short, long, default_value = "dist")]
    pub output: PathBuf,

    /// SQLite file caching target pages between builds
    #[arg(long, default_value = ".cache/http_cache.sqlite3")]
    pub cache: PathBuf,

    /// Always fetch target pages from the network
    #[arg(long)]
    pub no_cache: bool,

    /// Refetch cached pages older than this many seconds
    #[arg(long, value_name = "SECS")]
    pub cache_ttl: Option<u64>,

    /// Pages rendered at once (default: number of CPUs)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Skip scraping targets; every page gets the default title
    #[arg(long)]
    pub no_metadata: bool,
}

impl BuildArgs {
    pub fn template_path(&self) -> PathBuf {
        self.template
            .clone()
            .unwrap_or_else(|| self.assets.join("template.html"))
    }

    pub fn jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }
}
