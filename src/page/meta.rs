// src/page/meta.rs
// =============================================================================
// Scrapes display metadata from a redirect target.
//
// The redirect page shows the target's <title>, description and preview
// image while the browser navigates away. All of this is cosmetic:
// - a failed request or a non-2xx status gives the default metadata
// - a page without the tags gives the default metadata
// Nothing in here can fail the build.
//
// We use the `scraper` crate to parse the HTML and CSS selectors to find
// the tags, and the `url` crate to resolve relative image URLs.
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

use crate::config::Target;
use crate::fetch::Fetcher;

/// Title used when the target has none (or could not be fetched)
pub const DEFAULT_TITLE: &str = "Redirecting...";

/// Query parameter carrying the referral tag
pub const REF_PARAM: &str = "ref";

/// What a redirect page displays about its target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl PageMetadata {
    /// Default metadata for `url`
    pub fn new(url: impl Into<String>) -> Self {
        PageMetadata {
            url: url.into(),
            title: DEFAULT_TITLE.to_string(),
            description: None,
            image: None,
        }
    }

    /// Applies title/description pinned in the config
    pub fn with_overrides(mut self, target: &Target) -> Self {
        if let Some(title) = &target.title {
            self.title = title.clone();
        }
        if let Some(description) = &target.description {
            self.description = Some(description.clone());
        }
        self
    }
}

// Selectors are constants and known to be valid
fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static CSS selector")
}

/// Extracts metadata from an HTML document fetched from `url`
///
/// When a tag appears more than once, the last one wins.
pub fn scrape_metadata(url: &str, html: &str) -> PageMetadata {
    let document = Html::parse_document(html);
    let mut meta = PageMetadata::new(url);

    meta.description = last_content(&document, r#"meta[name="description"]"#);

    meta.image = last_content(&document, r#"meta[property="og:image"]"#)
        .and_then(|image| resolve_image(url, &image));

    let title = document
        .select(&selector("title"))
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());
    if let Some(title) = title {
        meta.title = title;
    }

    meta
}

fn last_content(document: &Html, css: &str) -> Option<String> {
    document
        .select(&selector(css))
        .filter_map(|element| element.value().attr("content"))
        .last()
        .map(str::to_string)
}

// Relative image paths are resolved against the page's origin, so
// "img/card.png" on https://example.com/docs/page is
// https://example.com/img/card.png, not .../docs/img/card.png
fn resolve_image(page_url: &str, image: &str) -> Option<String> {
    if let Ok(absolute) = Url::parse(image) {
        return Some(absolute.to_string());
    }
    Url::parse(page_url)
        .and_then(|base| base.join("/"))
        .and_then(|origin| origin.join(image))
        .map(|url| url.to_string())
        .ok()
}

/// Adds `ref=<tag>` to a URL, replacing any existing ref parameter
///
/// URLs that do not parse are returned untouched, as is every URL when
/// no tag is configured.
pub fn tag_url(url: &str, ref_tag: Option<&str>) -> String {
    let Some(tag) = ref_tag else {
        return url.to_string();
    };
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| key != REF_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    parsed
        .query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(REF_PARAM, tag);

    parsed.to_string()
}

/// Fetches `url` and scrapes it, falling back to defaults on any failure
pub async fn fetch_metadata(fetcher: &Fetcher, url: &str) -> PageMetadata {
    match fetcher.get_page(url).await {
        Ok(page) if page.is_success() => scrape_metadata(url, &page.body),
        Ok(page) => {
            tracing::debug!(url, status = page.status, "metadata fetch failed, using defaults");
            PageMetadata::new(url)
        }
        Err(e) => {
            tracing::debug!(url, error = %e, "metadata fetch failed, using defaults");
            PageMetadata::new(url)
        }
    }
}
