// src/hosts/modrinth.rs
// =============================================================================
// Modrinth user project listing.
//
// GET /v2/user/{handle}/projects returns every project in one response,
// so there is no pagination here. Each project is addressed on the public
// site as https://modrinth.com/{project_type}/{slug}.
// =============================================================================

use serde::Deserialize;
use url::Url;

use super::{read_json, ProjectRecord};
use crate::error::Error;
use crate::fetch::Fetcher;

const PROVIDER: &str = "Modrinth";
const SITE: &str = "https://modrinth.com";

#[derive(Debug, Deserialize)]
struct RinthProject {
    slug: String,
    project_type: String,
}

impl RinthProject {
    fn into_record(self) -> ProjectRecord {
        let website_url = format!("{}/{}/{}", SITE, self.project_type, self.slug);
        ProjectRecord {
            id: self.slug,
            project_type: Some(self.project_type),
            website_url,
        }
    }
}

/// Every project owned by `handle`
pub async fn user_projects(
    fetcher: &Fetcher,
    base_url: &str,
    handle: &str,
) -> Result<Vec<ProjectRecord>, Error> {
    let url = projects_url(base_url, handle)?;

    let response = fetcher.client().get(url).send().await?;
    let projects: Vec<RinthProject> = read_json(PROVIDER, response).await?;

    Ok(projects.into_iter().map(RinthProject::into_record).collect())
}

// {base}/v2/user/{handle}/projects, with the handle as a single
// percent-encoded path segment so '/', '?' or '#' cannot change the endpoint
fn projects_url(base_url: &str, handle: &str) -> Result<Url, Error> {
    let invalid = || Error::Config(format!("invalid Modrinth API URL '{}'", base_url));

    let mut url = Url::parse(base_url).map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|_| invalid())?
        .pop_if_empty()
        .extend(["v2", "user", handle, "projects"]);
    Ok(url)
}
