// src/site/resolve.rs
// =============================================================================
// Resolves the final redirect table from every source.
//
// Order of sources (later wins on the same key):
// 1. "redirects" from the config document
// 2. CurseForge projects, one search per configured game id
// 3. Modrinth projects
// Then every alias group is split into individual names.
//
// API calls run one after another; any hosting API error aborts the
// whole resolution.
// =============================================================================

use crate::config::RedirectConfig;
use crate::error::Error;
use crate::fetch::Fetcher;
use crate::hosts::{user_projects, CurseForge, HostSettings, ProjectRecord};
use crate::table::{RedirectTable, TableBuilder};

pub async fn resolve_table(
    config: &RedirectConfig,
    fetcher: &Fetcher,
    hosts: &HostSettings,
) -> Result<RedirectTable, Error> {
    let mut builder = TableBuilder::from_specs(&config.redirects);
    tracing::debug!(groups = builder.group_count(), "loaded configured redirects");

    if let Some(author_id) = &config.curseforge {
        let api_key = hosts
            .curse_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "a curseforge author is configured but CURSE_KEY is not set".to_string(),
                )
            })?;

        let client = CurseForge::new(fetcher, &hosts.curseforge_api, api_key);
        for &game_id in &config.curseforge_games {
            let projects = client.author_projects(game_id, author_id).await?;
            tracing::info!(game_id, count = projects.len(), "fetched CurseForge projects");
            merge(&mut builder, projects);
        }
    }

    if let Some(handle) = &config.modrinth {
        let projects = user_projects(fetcher, &hosts.modrinth_api, handle).await?;
        tracing::info!(handle = %handle, count = projects.len(), "fetched Modrinth projects");
        merge(&mut builder, projects);
    }

    builder.expand()
}

fn merge(builder: &mut TableBuilder, projects: Vec<ProjectRecord>) {
    for project in projects {
        tracing::debug!(id = %project.id, kind = ?project.project_type, "merging project");
        let target = project.target();
        builder.insert(project.id, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn hosts(server: &MockServer) -> HostSettings {
        HostSettings {
            curseforge_api: server.uri(),
            modrinth_api: server.uri(),
            curse_key: Some("key".to_string()),
        }
    }

    #[tokio::test]
    async fn test_static_only_makes_no_requests() {
        let config = parse_config(r#"{"redirects": {"a,b": "https://x"}}"#).unwrap();
        let fetcher = Fetcher::new(None).unwrap();
        let table = resolve_table(&config, &fetcher, &HostSettings::default())
            .await
            .unwrap();
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn test_merges_both_providers_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/mods/search"))
            .and(query_param("gameId", "432"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "id": 100, "links": { "websiteUrl": "https://cf/100" } }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/mods/search"))
            .and(query_param("gameId", "78022"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "id": 200, "links": { "websiteUrl": "https://cf/200" } }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/user/me/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "slug": "cool", "project_type": "mod" }
            ])))
            .mount(&server)
            .await;

        // "100" is configured statically and overwritten by CurseForge
        let config = parse_config(
            r#"{"curseforge": 7, "modrinth": "me",
                "redirects": {"100": "https://old", "home,h": "https://home"}}"#,
        )
        .unwrap();
        let fetcher = Fetcher::new(None).unwrap();
        let table = resolve_table(&config, &fetcher, &hosts(&server))
            .await
            .unwrap();

        let names: Vec<String> = table.entries().map(|e| e.name).collect();
        assert_eq!(names, vec!["100", "home", "h", "200", "cool"]);
        assert_eq!(table.get("100").unwrap().url, "https://cf/100");
        assert_eq!(table.get("cool").unwrap().url, "https://modrinth.com/mod/cool");
    }

    #[tokio::test]
    async fn test_missing_api_key_is_config_error() {
        let config = parse_config(r#"{"curseforge": 7, "redirects": {}}"#).unwrap();
        let fetcher = Fetcher::new(None).unwrap();
        let err = resolve_table(&config, &fetcher, &HostSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_api_failure_aborts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("down"))
            .mount(&server)
            .await;

        let config = parse_config(r#"{"modrinth": "me", "redirects": {"a": "https://a"}}"#)
            .unwrap();
        let fetcher = Fetcher::new(None).unwrap();
        let err = resolve_table(&config, &fetcher, &hosts(&server))
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
}
