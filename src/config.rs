// src/config.rs
// =============================================================================
// Loads the redirect configuration document.
//
// The document is JSON:
//
//   {
//     "curseforge": 12345,              (optional, author id)
//     "modrinth": "someone",            (optional, author handle)
//     "ref": "example.dev",             (optional, referral tag)
//     "curseforge_games": [432, 78022], (optional, game ids to search)
//     "redirects": {
//       "docs,documentation": "https://example.com/docs",
//       "blog": { "url": "https://blog.example.com", "title": "Blog" }
//     }
//   }
//
// Document order of "redirects" matters: it becomes the order of the
// generated index. serde_json's default Map is sorted, so the redirects
// map is read with a hand-written Visitor that keeps entries in the order
// they appear in the file.
// =============================================================================

use crate::error::Error;
use anyhow::{Context, Result};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Minecraft (Java Edition) on CurseForge
pub const MINECRAFT_GAME_ID: u32 = 432;
/// Minecraft Bedrock on CurseForge
pub const MINECRAFT_BEDROCK_GAME_ID: u32 = 78022;

/// Where a redirect points, plus optional metadata overrides
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawTarget")]
pub struct Target {
    pub url: String,
    /// Replaces the scraped <title> when set
    pub title: Option<String>,
    /// Replaces the scraped description when set
    pub description: Option<String>,
}

impl Target {
    pub fn url(url: impl Into<String>) -> Self {
        Target {
            url: url.into(),
            title: None,
            description: None,
        }
    }
}

// A target is either a bare URL string or an object with a url field
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTarget {
    Url(String),
    Detailed {
        url: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        description: Option<String>,
    },
}

impl From<RawTarget> for Target {
    fn from(raw: RawTarget) -> Self {
        match raw {
            RawTarget::Url(url) => Target::url(url),
            RawTarget::Detailed {
                url,
                title,
                description,
            } => Target {
                url,
                title,
                description,
            },
        }
    }
}

/// One configuration line: a comma-separated alias group and its target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectSpec {
    pub aliases: String,
    pub target: Target,
}

// CurseForge author ids are numbers, but a quoted id is accepted too
#[derive(Deserialize)]
#[serde(untagged)]
enum AuthorId {
    Number(u64),
    Text(String),
}

fn author_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<AuthorId>::deserialize(deserializer)?.map(|id| match id {
        AuthorId::Number(n) => n.to_string(),
        AuthorId::Text(s) => s,
    }))
}

fn default_games() -> Vec<u32> {
    vec![MINECRAFT_GAME_ID, MINECRAFT_BEDROCK_GAME_ID]
}

/// The parsed configuration document
#[derive(Debug, Clone, Deserialize)]
pub struct RedirectConfig {
    #[serde(default, deserialize_with = "author_id")]
    pub curseforge: Option<String>,

    #[serde(default)]
    pub modrinth: Option<String>,

    /// Query parameter value appended as ?ref=... to every page target
    #[serde(default, rename = "ref")]
    pub ref_tag: Option<String>,

    #[serde(default = "default_games")]
    pub curseforge_games: Vec<u32>,

    #[serde(deserialize_with = "ordered_specs")]
    pub redirects: Vec<RedirectSpec>,
}

impl RedirectConfig {
    /// Rejects entries that could never produce a working page
    pub fn validate(&self) -> Result<(), Error> {
        for spec in &self.redirects {
            if spec.target.url.trim().is_empty() {
                return Err(Error::Config(format!(
                    "redirect '{}' has an empty target URL",
                    spec.aliases
                )));
            }
        }
        if let Some(handle) = &self.modrinth {
            if handle.trim().is_empty() {
                return Err(Error::Config("modrinth handle is empty".to_string()));
            }
        }
        Ok(())
    }
}

fn ordered_specs<'de, D>(deserializer: D) -> Result<Vec<RedirectSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    struct SpecVisitor;

    impl<'de> Visitor<'de> for SpecVisitor {
        type Value = Vec<RedirectSpec>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of alias groups to target URLs")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut specs = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((aliases, target)) = map.next_entry::<String, Target>()? {
                specs.push(RedirectSpec { aliases, target });
            }
            Ok(specs)
        }
    }

    deserializer.deserialize_map(SpecVisitor)
}

/// Parses and validates a configuration document
pub fn parse_config(content: &str) -> Result<RedirectConfig, Error> {
    let config: RedirectConfig =
        serde_json::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Reads the configuration document from disk
pub fn load_config(path: &Path) -> Result<RedirectConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = parse_config(&content)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config = parse_config(r#"{"redirects": {"foo": "https://example.com"}}"#).unwrap();
        assert_eq!(config.curseforge, None);
        assert_eq!(config.modrinth, None);
        assert_eq!(config.ref_tag, None);
        assert_eq!(config.curseforge_games, vec![432, 78022]);
        assert_eq!(
            config.redirects,
            vec![RedirectSpec {
                aliases: "foo".to_string(),
                target: Target::url("https://example.com"),
            }]
        );
    }

    #[test]
    fn test_redirects_keep_document_order() {
        let config = parse_config(
            r#"{"redirects": {"zeta": "https://z", "alpha": "https://a", "mid,m": "https://m"}}"#,
        )
        .unwrap();
        let aliases: Vec<&str> = config.redirects.iter().map(|s| s.aliases.as_str()).collect();
        assert_eq!(aliases, vec!["zeta", "alpha", "mid,m"]);
    }

    #[test]
    fn test_object_target() {
        let config = parse_config(
            r#"{"redirects": {"blog": {"url": "https://blog.example.com", "title": "Blog"}}}"#,
        )
        .unwrap();
        let target = &config.redirects[0].target;
        assert_eq!(target.url, "https://blog.example.com");
        assert_eq!(target.title.as_deref(), Some("Blog"));
        assert_eq!(target.description, None);
    }

    #[test]
    fn test_author_id_number_or_string() {
        let numeric = parse_config(r#"{"curseforge": 42, "redirects": {}}"#).unwrap();
        assert_eq!(numeric.curseforge.as_deref(), Some("42"));

        let text = parse_config(r#"{"curseforge": "42", "modrinth": "me", "redirects": {}}"#)
            .unwrap();
        assert_eq!(text.curseforge.as_deref(), Some("42"));
        assert_eq!(text.modrinth.as_deref(), Some("me"));
    }

    #[test]
    fn test_ref_tag_and_games() {
        let config = parse_config(
            r#"{"ref": "example.dev", "curseforge_games": [432], "redirects": {}}"#,
        )
        .unwrap();
        assert_eq!(config.ref_tag.as_deref(), Some("example.dev"));
        assert_eq!(config.curseforge_games, vec![432]);
    }

    #[test]
    fn test_missing_redirects_is_error() {
        let result = parse_config(r#"{"modrinth": "me"}"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_target_is_error() {
        let result = parse_config(r#"{"redirects": {"foo": ""}}"#);
        assert!(matches!(result, Err(Error::Config(_))));

        let result = parse_config(r#"{"redirects": {"foo": {"url": "  "}}}"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_config_reports_path() {
        let err = load_config(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
