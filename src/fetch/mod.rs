// src/fetch/mod.rs
// =============================================================================
// HTTP access for the build.
//
// Submodules:
// - client: the shared Fetcher handle (reqwest client + optional cache)
// - cache: SQLite response cache for target pages
// =============================================================================

mod cache;
mod client;

pub use cache::HttpCache;
pub use client::{FetchedPage, Fetcher};
