// src/logging.rs
// =============================================================================
// Sets up logging with `tracing`.
//
// Two kinds of output:
// - stdout: what the user asked for (page list, summary, `list` table)
// - stderr: log lines from tracing macros (info!, warn!, debug!)
//
// Keeping them apart means `redirect-pages list --json > table.json`
// never gets log lines mixed into the JSON.
// =============================================================================

use tracing_subscriber::EnvFilter;

/// Default filter when RUST_LOG is not set
const DEFAULT_FILTER: &str = "warn,redirect_pages=info";
const VERBOSE_FILTER: &str = "warn,redirect_pages=debug";

/// Initialize structured logging on stderr.
///
/// RUST_LOG takes precedence; otherwise `verbose` picks between the info
/// and debug level for this crate. Stdout stays free for the page list
/// and `list --json` output.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (e.g. from tests) is not an error worth reporting
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
