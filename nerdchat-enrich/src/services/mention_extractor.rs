//! Artist mention extraction
//!
//! Scans free-form text for known artist identifiers and returns canonical
//! display names in registry order, one per artist.
//!
//! The default [`SubstringMatch`] policy has no word boundaries, so "bicep"
//! is found inside "biceps". [`WholeWordMatch`] trades that recall for
//! precision; the policy is chosen at construction.

use crate::registry::{ArtistEntry, ArtistRegistry};
use nerdchat_common::config::MatchStrategy;
use std::sync::Arc;
use tracing::debug;

/// Decides whether an identifier occurs in lower-cased text
pub trait MatchPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `text_lower` is already lower-cased; `identifier` is normalized
    fn matches(&self, text_lower: &str, identifier: &str) -> bool;
}

/// Plain substring containment
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatch;

impl MatchPolicy for SubstringMatch {
    fn name(&self) -> &'static str {
        "substring"
    }

    fn matches(&self, text_lower: &str, identifier: &str) -> bool {
        text_lower.contains(identifier)
    }
}

/// Containment bounded by non-alphanumeric characters or the text edges
#[derive(Debug, Clone, Copy, Default)]
pub struct WholeWordMatch;

impl MatchPolicy for WholeWordMatch {
    fn name(&self) -> &'static str {
        "whole_word"
    }

    fn matches(&self, text_lower: &str, identifier: &str) -> bool {
        if identifier.is_empty() {
            return false;
        }
        // Step one char past each hit so overlapping occurrences are checked too
        let step = identifier.chars().next().map_or(1, char::len_utf8);
        let mut from = 0;
        while let Some(offset) = text_lower[from..].find(identifier) {
            let start = from + offset;
            let end = start + identifier.len();
            let before_ok = text_lower[..start]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
            let after_ok = text_lower[end..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric());
            if before_ok && after_ok {
                return true;
            }
            from = start + step;
        }
        false
    }
}

/// Policy for a configured strategy
pub fn policy_for(strategy: MatchStrategy) -> Box<dyn MatchPolicy> {
    match strategy {
        MatchStrategy::Substring => Box::new(SubstringMatch),
        MatchStrategy::WholeWord => Box::new(WholeWordMatch),
    }
}

/// Finds known artists in user text
pub struct MentionExtractor {
    registry: Arc<ArtistRegistry>,
    policy: Box<dyn MatchPolicy>,
}

impl MentionExtractor {
    /// Substring matching
    pub fn new(registry: Arc<ArtistRegistry>) -> Self {
        Self::with_policy(registry, Box::new(SubstringMatch))
    }

    pub fn with_policy(registry: Arc<ArtistRegistry>, policy: Box<dyn MatchPolicy>) -> Self {
        Self { registry, policy }
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Canonical names of the known artists mentioned in `free_text`
    ///
    /// Ordered by registry, not by position in the text.
    pub fn find_mentions(&self, free_text: &str) -> Vec<String> {
        let found: Vec<String> = self
            .find_entries(free_text)
            .into_iter()
            .map(|entry| entry.display_name.clone())
            .collect();

        debug!(policy = self.policy.name(), mentions = ?found, "Scanned text for artist mentions");
        found
    }

    /// Registry entries of the mentioned artists, same order as [`find_mentions`]
    ///
    /// [`find_mentions`]: Self::find_mentions
    pub fn find_entries(&self, free_text: &str) -> Vec<&ArtistEntry> {
        let text_lower = free_text.to_lowercase();
        self.registry
            .iter()
            .filter(|entry| self.policy.matches(&text_lower, &entry.identifier))
            .collect()
    }
}
