//! Known-artist registry
//!
//! Fixed mapping from normalized identifier to display name and external
//! source ID. Loaded once at startup; the pipeline only reads it. Iteration
//! order is configuration order.

use nerdchat_common::config::ArtistConfig;
use std::collections::HashMap;
use tracing::warn;

/// One curated artist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistEntry {
    /// Normalized lookup key
    pub identifier: String,
    /// Canonical display name
    pub display_name: String,
    /// Opaque ID on the external source
    pub external_id: String,
}

/// Normalize an artist identifier for lookup (trimmed, lower-cased)
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Immutable, ordered set of known artists
#[derive(Debug, Clone, Default)]
pub struct ArtistRegistry {
    entries: Vec<ArtistEntry>,
    index: HashMap<String, usize>,
}

impl ArtistRegistry {
    /// Build from entries, keeping the first occurrence of each identifier
    pub fn new(entries: impl IntoIterator<Item = ArtistEntry>) -> Self {
        let mut registry = Self::default();
        for mut entry in entries {
            entry.identifier = normalize_identifier(&entry.identifier);
            if entry.identifier.is_empty() {
                warn!(display_name = %entry.display_name, "Skipping artist with empty identifier");
                continue;
            }
            if registry.index.contains_key(&entry.identifier) {
                warn!(identifier = %entry.identifier, "Duplicate artist identifier, keeping first");
                continue;
            }
            registry
                .index
                .insert(entry.identifier.clone(), registry.entries.len());
            registry.entries.push(entry);
        }
        registry
    }

    /// Build from configuration; identifier defaults to the lower-cased name
    pub fn from_config(artists: &[ArtistConfig]) -> Self {
        Self::new(artists.iter().map(|artist| ArtistEntry {
            identifier: artist
                .identifier
                .clone()
                .unwrap_or_else(|| artist.name.clone()),
            display_name: artist.name.trim().to_string(),
            external_id: artist.external_id.trim().to_string(),
        }))
    }

    /// Case-insensitive lookup
    pub fn get(&self, identifier: &str) -> Option<&ArtistEntry> {
        self.index
            .get(&normalize_identifier(identifier))
            .map(|&i| &self.entries[i])
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.get(identifier).is_some()
    }

    /// Entries in registry order
    pub fn iter(&self) -> impl Iterator<Item = &ArtistEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
