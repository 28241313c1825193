// src/table.rs
// =============================================================================
// The redirect table: an insertion-ordered map from name to target.
//
// Building it happens in two layers:
// 1. Alias groups ("docs,documentation") from the config document, then
//    hosting API projects keyed by their id/slug, all merged into one
//    ordered map. A later source overwrites an earlier one with the same
//    key, but the key keeps its original position.
// 2. Every alias group is split on commas into individual names, again
//    with last-write-wins and first-position semantics.
//
// The resulting order is the order of the generated index.
// =============================================================================

use crate::config::{RedirectSpec, Target};
use crate::error::Error;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Component, Path};

/// Separator between names in an alias group
pub const ALIAS_DELIMITER: char = ',';

/// One resolved name -> target pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectEntry {
    pub name: String,
    pub target: Target,
}

/// One record of the generated redirects.json index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexRecord<'a> {
    pub name: &'a str,
    pub target: &'a str,
}

// Ordered map with last-write-wins updates.
// A Vec keeps the order, the HashMap finds existing keys.
#[derive(Debug, Clone, Default)]
struct OrderedMap {
    items: Vec<(String, Target)>,
    positions: HashMap<String, usize>,
}

impl OrderedMap {
    fn insert(&mut self, key: String, target: Target) {
        match self.positions.get(&key) {
            Some(&pos) => self.items[pos].1 = target,
            None => {
                self.positions.insert(key.clone(), self.items.len());
                self.items.push((key, target));
            }
        }
    }
}

/// Collects alias groups from every source before expansion
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    groups: OrderedMap,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the statically configured mapping
    pub fn from_specs(specs: &[RedirectSpec]) -> Self {
        let mut builder = Self::new();
        for spec in specs {
            builder.insert(spec.aliases.clone(), spec.target.clone());
        }
        builder
    }

    /// Adds or overwrites one alias group
    pub fn insert(&mut self, aliases: impl Into<String>, target: Target) {
        self.groups.insert(aliases.into(), target);
    }

    /// Number of alias groups collected so far
    pub fn group_count(&self) -> usize {
        self.groups.items.len()
    }

    /// Splits every alias group into individual names
    ///
    /// Names are trimmed. An empty name, an absolute path or a ".." segment
    /// is a configuration error since the name becomes a file path.
    pub fn expand(self) -> Result<RedirectTable, Error> {
        let mut names = OrderedMap::default();
        for (aliases, target) in self.groups.items {
            for name in aliases.split(ALIAS_DELIMITER) {
                let name = name.trim();
                validate_name(name, &aliases)?;
                names.insert(name.to_string(), target.clone());
            }
        }
        Ok(RedirectTable { entries: names })
    }
}

fn validate_name(name: &str, group: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::Config(format!(
            "alias group '{}' contains an empty name",
            group
        )));
    }

    // "a/" or "a//b" would be normalised away by Path, leaving "a/.html"
    if name.split('/').any(str::is_empty) {
        return Err(Error::Config(format!(
            "name '{}' has an empty path segment",
            name
        )));
    }

    let escapes = Path::new(name)
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if escapes {
        return Err(Error::Config(format!(
            "name '{}' must be a relative path without '.' or '..' segments",
            name
        )));
    }

    Ok(())
}

/// The final, deduplicated redirect table
#[derive(Debug, Clone, Default)]
pub struct RedirectTable {
    entries: OrderedMap,
}

impl RedirectTable {
    pub fn len(&self) -> usize {
        self.entries.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.items.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Target> {
        self.entries
            .positions
            .get(name)
            .map(|&pos| &self.entries.items[pos].1)
    }

    /// Entries in table order
    pub fn entries(&self) -> impl Iterator<Item = RedirectEntry> + '_ {
        self.entries.items.iter().map(|(name, target)| RedirectEntry {
            name: name.clone(),
            target: target.clone(),
        })
    }

    /// Records for the redirects.json index, in table order
    pub fn index_records(&self) -> Vec<IndexRecord<'_>> {
        self.entries
            .items
            .iter()
            .map(|(name, target)| IndexRecord {
                name,
                target: &target.url,
            })
            .collect()
    }

    /// The index serialized as compact JSON
    pub fn index_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.index_records())
    }
}
