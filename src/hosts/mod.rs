// src/hosts/mod.rs
// =============================================================================
// Clients for the two mod-hosting APIs that feed the redirect table.
//
// Submodules:
// - curseforge: paginated project search by game id and author id
// - modrinth: one-shot project listing for a user handle
//
// Both turn their payloads into ProjectRecords, which the table builder
// merges keyed by project id (CurseForge) or slug (Modrinth).
//
// Any non-2xx answer is fatal for the build. A partial redirect table
// would silently drop pages, so the error goes all the way up and main()
// exits with code 1.
// =============================================================================

mod curseforge;
mod modrinth;

pub use curseforge::CurseForge;
pub use modrinth::user_projects;

use crate::config::Target;
use crate::error::Error;
use serde::de::DeserializeOwned;

pub const CURSEFORGE_API: &str = "https://api.curseforge.com";
pub const MODRINTH_API: &str = "https://api.modrinth.com";

/// A project pulled from a hosting API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRecord {
    /// Numeric id (CurseForge) or slug (Modrinth); becomes the table key
    pub id: String,
    pub project_type: Option<String>,
    pub website_url: String,
}

impl ProjectRecord {
    pub fn target(&self) -> Target {
        Target::url(self.website_url.clone())
    }
}

/// Where the hosting APIs live and how to authenticate
#[derive(Debug, Clone)]
pub struct HostSettings {
    pub curseforge_api: String,
    pub modrinth_api: String,
    /// CurseForge requires an API key; Modrinth reads are anonymous
    pub curse_key: Option<String>,
}

impl Default for HostSettings {
    fn default() -> Self {
        HostSettings {
            curseforge_api: CURSEFORGE_API.to_string(),
            modrinth_api: MODRINTH_API.to_string(),
            curse_key: None,
        }
    }
}

// Decodes a JSON body, or turns a non-2xx status into Error::Upstream
// after logging the status and body
async fn read_json<T: DeserializeOwned>(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<T, Error> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(
            provider,
            status = status.as_u16(),
            body = %body,
            "Failed to get {} projects",
            provider
        );
        return Err(Error::Upstream {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json::<T>().await?)
}
