//! Resolved artist document
//!
//! Built once per successful fetch and never mutated afterwards. A later fetch
//! for the same artist replaces the document wholesale.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Link label → URL
pub type LinkMap = BTreeMap<String, String>;

/// Structured result of resolving one artist page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistDocument {
    /// Canonical display name
    pub name: String,
    /// Page the document was extracted from
    pub source_url: String,
    /// De-tagged page text, used as free context for the language model
    pub raw_text: String,
    /// Social network links (Instagram, Twitter, ...)
    #[serde(default)]
    pub social_links: LinkMap,
    /// Music platform links (Spotify, SoundCloud, ...)
    #[serde(default)]
    pub platform_links: LinkMap,
}

impl ArtistDocument {
    /// First `max_chars` characters of the page text
    ///
    /// Cuts on a character boundary, never inside a multi-byte sequence.
    pub fn excerpt(&self, max_chars: usize) -> &str {
        match self.raw_text.char_indices().nth(max_chars) {
            Some((byte_index, _)) => &self.raw_text[..byte_index],
            None => &self.raw_text,
        }
    }

    /// Whether extraction found any classified links
    pub fn has_links(&self) -> bool {
        !self.social_links.is_empty() || !self.platform_links.is_empty()
    }
}
