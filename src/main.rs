// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Load a .env file (if any) so CURSE_KEY can live outside the shell
// 2. Parse command-line arguments using clap
// 3. Set up logging
// 4. Dispatch to the appropriate subcommand handler
// 5. Exit with proper code (0 = success, 1 = hosting API failed, 2 = error)
//
// Exit code 1 is reserved for the hosting APIs: a build that could not
// list every project must not be deployed, and CI can tell that apart
// from a broken config.
// =============================================================================

mod cli;
mod config;
mod error;
mod fetch;
mod hosts;
mod logging;
mod page;
mod site;
mod table;

use anyhow::Result;
use clap::Parser;
use cli::{BuildArgs, Cli, Commands, SourceArgs};
use std::time::Duration;

use fetch::{Fetcher, HttpCache};
use table::RedirectTable;

#[tokio::main]
async fn main() {
    // A missing .env file is the normal case
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    // If parsing fails (e.g., missing required args), clap prints help and exits
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    // Run the command; any error bubbles up here with its context chain

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            error::exit_code_for(&e)
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Build(args) => handle_build(args).await,
        Commands::List { source, json } => handle_list(source, json).await,
    }
}

// Handles the 'build' subcommand
async fn handle_build(args: BuildArgs) -> Result<()> {
    println!("🔨 Building redirect pages");
    println!("   Config: {}", args.source.config.display());
    println!("   Output: {}", args.output.display());

    let cache = if args.no_cache {
        None
    } else {
        let ttl = args.cache_ttl.map(Duration::from_secs);
        match HttpCache::open(&args.cache, ttl).await {
            Ok(cache) => Some(cache),
            Err(e) => {
                // The cache only saves time; build without it
                tracing::warn!(path = %args.cache.display(), error = %e, "response cache unavailable");
                None
            }
        }
    };
    // One HTTP handle for the whole build, shared by the API clients
    // and every page task
    let fetcher = Fetcher::new(cache)?;

    let options = site::BuildOptions {
        config_path: args.source.config.clone(),
        assets_dir: args.assets.clone(),
        template_path: args.template_path(),
        output_dir: args.output.clone(),
        jobs: args.jobs(),
        scrape: !args.no_metadata,
        hosts: args.source.host_settings(),
    };

    let report = site::build(&options, &fetcher).await?;

    println!();
    println!("📊 Summary:");
    println!("   📄 Pages: {}", report.pages);
    println!("   📁 Assets: {}", report.assets);
    println!("   📋 Index: {}", report.index_path.display());
    Ok(())
}

// Handles the 'list' subcommand
async fn handle_list(source: SourceArgs, json: bool) -> Result<()> {
    // Listing never scrapes pages, so there is nothing worth caching
    let fetcher = Fetcher::new(None)?;
    let table = site::resolve(&source.config, &fetcher, &source.host_settings()).await?;
    print_table(&table, json)
}

// Prints the table either as text or as the same JSON as redirects.json
fn print_table(table: &RedirectTable, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&table.index_records())?);
        return Ok(());
    }

    println!("{:<30} {:<70}", "NAME", "TARGET");
    println!("{}", "=".repeat(100));
    for record in table.index_records() {
        println!("{:<30} {:<70}", record.name, record.target);
    }
    println!();
    println!("📋 Total: {}", table.len());
    Ok(())
}
