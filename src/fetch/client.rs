// src/fetch/client.rs
// =============================================================================
// The one HTTP handle the whole build shares.
//
// A Fetcher bundles:
// - a reqwest Client (connection pooling, timeout, redirect limit)
// - an optional HttpCache for target pages
//
// It is constructed once in main() and passed down explicitly, so the
// table builder and page renderer can be tested against mock servers with
// their own Fetcher.
//
// Rust concepts:
// - Clone on handles: Client and the sqlx pool are reference counted, so
//   cloning a Fetcher per task is cheap
// - Result<T, E>: network failures come back as Error::Http
// =============================================================================

use reqwest::Client;
use std::time::Duration;

use super::cache::HttpCache;
use crate::error::Error;

/// Sent with every request; some hosts reject clients without one
pub const USER_AGENT: &str = concat!("redirect-pages/", env!("CARGO_PKG_VERSION"));

/// Status and body of a GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    /// 2xx status codes mean success
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Clone, Debug)]
pub struct Fetcher {
    client: Client,
    cache: Option<HttpCache>,
}

impl Fetcher {
    /// Builds the shared client: 10 second timeout, up to 5 redirects
    pub fn new(cache: Option<HttpCache>) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Fetcher { client, cache })
    }

    /// The raw client, for API calls that need headers or query params
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// GETs a page, going through the cache when one is configured
    ///
    /// Cache problems are logged and otherwise ignored: the cache only
    /// saves time, it never decides what a page contains.
    pub async fn get_page(&self, url: &str) -> Result<FetchedPage, Error> {
        if let Some(cache) = &self.cache {
            match cache.get(url).await {
                Ok(Some(hit)) => {
                    tracing::debug!(url, "cache hit");
                    return Ok(hit);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(url, error = %e, "cache lookup failed"),
            }
        }

        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        let page = FetchedPage { status, body };

        // Only successful responses are worth remembering
        if page.is_success() {
            if let Some(cache) = &self.cache {
                if let Err(e) = cache.put(url, &page).await {
                    tracing::warn!(url, error = %e, "cache store failed");
                }
            }
        }

        Ok(page)
    }
}
