//! Cache-first artist enrichment
//!
//! `get_artist_info` consults the freshness cache, falls back to the artist
//! source on a miss, and persists what the source returns. At most one
//! resolution attempt per call; concurrent calls for the same artist may
//! both fetch (last write wins).

use super::artist_resolver::ArtistSource;
use crate::cache::FreshnessCache;
use crate::models::ArtistDocument;
use crate::registry::normalize_identifier;
use nerdchat_common::config::DEFAULT_MAX_AGE_HOURS;
use nerdchat_common::time::hours_to_duration;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default freshness window
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(DEFAULT_MAX_AGE_HOURS * 3600);

/// What to do when resolution yields nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegativeCaching {
    /// Never cache a failed lookup; the next call retries, so an artist
    /// recovers as soon as the source is reachable again
    #[default]
    Disabled,
    /// Record a tombstone and answer `None` from cache for the freshness window
    Enabled,
}

impl From<bool> for NegativeCaching {
    fn from(enabled: bool) -> Self {
        if enabled {
            NegativeCaching::Enabled
        } else {
            NegativeCaching::Disabled
        }
    }
}

/// Orchestrates cache and resolver; owns no state of its own
///
/// Cheap to clone, so a lookup can be spawned and left to finish populating
/// the cache after the chat turn that started it is gone.
#[derive(Clone)]
pub struct EnrichmentService {
    cache: FreshnessCache,
    source: Arc<dyn ArtistSource>,
    negative_caching: NegativeCaching,
    default_max_age: Duration,
}

impl EnrichmentService {
    pub fn new(cache: FreshnessCache, source: Arc<dyn ArtistSource>) -> Self {
        Self {
            cache,
            source,
            negative_caching: NegativeCaching::default(),
            default_max_age: DEFAULT_MAX_AGE,
        }
    }

    pub fn with_negative_caching(mut self, policy: NegativeCaching) -> Self {
        self.negative_caching = policy;
        self
    }

    /// Freshness window used by [`Self::get_artist_info_default`]
    pub fn with_default_max_age_hours(mut self, hours: u64) -> Self {
        self.default_max_age = hours_to_duration(hours);
        self
    }

    pub fn negative_caching(&self) -> NegativeCaching {
        self.negative_caching
    }

    pub fn default_max_age(&self) -> Duration {
        self.default_max_age
    }

    pub fn cache(&self) -> &FreshnessCache {
        &self.cache
    }

    /// Artist document from cache, or from the source on a miss
    ///
    /// `None` means no factual context is available for this artist right now.
    pub async fn get_artist_info(
        &self,
        artist_identifier: &str,
        max_age: Duration,
    ) -> Option<ArtistDocument> {
        let key = normalize_identifier(artist_identifier);
        info!(artist = %key, "Fetching info for artist");

        match self.cache.get(&key, max_age).await {
            Some(Value::Null) if self.negative_caching == NegativeCaching::Enabled => {
                debug!(artist = %key, "Fresh negative cache entry, skipping resolution");
                return None;
            }
            Some(payload) => match serde_json::from_value::<ArtistDocument>(payload) {
                Ok(document) => {
                    info!(artist = %key, "Found cached info");
                    return Some(document);
                }
                Err(e) => {
                    debug!(artist = %key, error = %e, "Cached payload unusable, resolving");
                }
            },
            None => {}
        }

        info!(artist = %key, "Cache miss, resolving artist");
        match self.source.resolve(&key).await {
            Some(document) => {
                if !self.cache.set_document(&key, &document).await {
                    warn!(artist = %key, "Resolved artist but could not cache the result");
                }
                Some(document)
            }
            None => {
                warn!(artist = %key, "Failed to resolve artist");
                if self.negative_caching == NegativeCaching::Enabled {
                    self.cache.set(&key, Value::Null).await;
                }
                None
            }
        }
    }

    /// [`Self::get_artist_info`] with the configured default window
    pub async fn get_artist_info_default(&self, artist_identifier: &str) -> Option<ArtistDocument> {
        self.get_artist_info(artist_identifier, self.default_max_age).await
    }
}
