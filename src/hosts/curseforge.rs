// src/hosts/curseforge.rs
// =============================================================================
// CurseForge project search.
//
// GET /v1/mods/search?gameId=..&authorId=..&index=..&pageSize=50
//
// The search is paginated: each page holds at most 50 mods, and a page
// with fewer than 50 means there is nothing after it. Pages are produced
// lazily as a Stream, so a caller can stop early or collect everything.
// =============================================================================

use futures::stream::{self, Stream, TryStreamExt};
use serde::Deserialize;

use super::{read_json, ProjectRecord};
use crate::error::Error;
use crate::fetch::Fetcher;

/// Records per page; a shorter page ends the listing
pub const PAGE_SIZE: usize = 50;

const PROVIDER: &str = "CurseForge";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Vec<CurseMod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurseMod {
    id: u64,
    #[serde(default)]
    class_id: Option<u64>,
    #[serde(default)]
    links: CurseLinks,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurseLinks {
    #[serde(default)]
    website_url: Option<String>,
}

impl CurseMod {
    fn into_record(self) -> Option<ProjectRecord> {
        match self.links.website_url {
            Some(url) if !url.is_empty() => Some(ProjectRecord {
                id: self.id.to_string(),
                project_type: self.class_id.map(|c| c.to_string()),
                website_url: url,
            }),
            _ => {
                tracing::debug!(id = self.id, "skipping CurseForge project without website URL");
                None
            }
        }
    }
}

/// Search client bound to one API base URL and key
pub struct CurseForge<'a> {
    fetcher: &'a Fetcher,
    base_url: &'a str,
    api_key: &'a str,
}

impl<'a> CurseForge<'a> {
    pub fn new(fetcher: &'a Fetcher, base_url: &'a str, api_key: &'a str) -> Self {
        CurseForge {
            fetcher,
            base_url: base_url.trim_end_matches('/'),
            api_key,
        }
    }

    // Fetches one page starting at `index`
    async fn search_page(
        &self,
        game_id: u32,
        author_id: &str,
        index: usize,
    ) -> Result<Vec<CurseMod>, Error> {
        let url = format!("{}/v1/mods/search", self.base_url);
        let game_id = game_id.to_string();
        let index = index.to_string();
        let page_size = PAGE_SIZE.to_string();

        let response = self
            .fetcher
            .client()
            .get(&url)
            .query(&[
                ("gameId", game_id.as_str()),
                ("authorId", author_id),
                ("index", index.as_str()),
                ("pageSize", page_size.as_str()),
            ])
            .header("Accept", "application/json")
            .header("x-api-key", self.api_key)
            .send()
            .await?;

        let page: SearchResponse = read_json(PROVIDER, response).await?;
        Ok(page.data)
    }

    /// Lazily walks the search results one page at a time
    pub fn pages<'s>(
        &'s self,
        game_id: u32,
        author_id: &'s str,
    ) -> impl Stream<Item = Result<Vec<ProjectRecord>, Error>> + 's {
        stream::try_unfold(Some(0usize), move |index| async move {
            let Some(index) = index else {
                return Ok::<_, Error>(None);
            };

            let mods = self.search_page(game_id, author_id, index).await?;
            tracing::debug!(game_id, index, count = mods.len(), "CurseForge page");

            // A short page is the last one
            let next = (mods.len() >= PAGE_SIZE).then_some(index + PAGE_SIZE);
            let records = mods.into_iter().filter_map(CurseMod::into_record).collect();
            Ok::<_, Error>(Some((records, next)))
        })
    }

    /// Every project the author has for one game
    pub async fn author_projects(
        &self,
        game_id: u32,
        author_id: &str,
    ) -> Result<Vec<ProjectRecord>, Error> {
        self.pages(game_id, author_id).try_concat().await
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does stream::try_unfold do?
//    - It builds a Stream from a state value and an async step function
//    - The state here is the next page index (None once we are done)
//    - Each step returns Some((item, next_state)) or None to finish
//
// 2. Why Ok::<_, Error>(..)?
//    - The async block has two return points; the turbofish tells the
//      compiler the error type so `?` inside the block knows what to convert to
//
// 3. What does try_concat do?
//    - Appends every Vec the stream yields into one Vec
//    - Stops at the first Err and returns it, so one failed page fails all
// -----------------------------------------------------------------------------
