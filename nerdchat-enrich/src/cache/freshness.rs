//! Freshness cache
//!
//! Durable key → document store with a staleness threshold chosen per read.
//! Fails soft in both directions: a read problem is a miss, a write problem
//! is logged and the caller keeps its in-memory value.

use super::store::KeyValueStore;
use crate::models::{ArtistDocument, CacheEntry};
use chrono::{DateTime, Utc};
use nerdchat_common::time;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Time-stamped document cache over a [`KeyValueStore`]
#[derive(Clone)]
pub struct FreshnessCache {
    store: Arc<dyn KeyValueStore>,
}

impl FreshnessCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Backend name for logging
    pub fn backend(&self) -> &'static str {
        self.store.name()
    }

    /// Payload for `key` if present and younger than `max_age`
    ///
    /// Missing, stale and unreadable entries all return `None`.
    pub async fn get(&self, key: &str, max_age: Duration) -> Option<Value> {
        self.get_at(key, max_age, time::now()).await
    }

    /// Store `payload` under `key`, stamped with the current time
    ///
    /// Returns whether the entry was persisted. Failures are logged, never raised.
    pub async fn set(&self, key: &str, payload: Value) -> bool {
        self.set_at(key, payload, time::now()).await
    }

    /// Typed read; a payload that no longer matches the document shape is a miss
    pub async fn get_document(&self, key: &str, max_age: Duration) -> Option<ArtistDocument> {
        let payload = self.get(key, max_age).await?;
        match serde_json::from_value(payload) {
            Ok(document) => Some(document),
            Err(e) => {
                debug!(
                    key = %key,
                    error = %e,
                    "Cached payload is not an artist document, treating as miss"
                );
                None
            }
        }
    }

    /// Typed write
    pub async fn set_document(&self, key: &str, document: &ArtistDocument) -> bool {
        match serde_json::to_value(document) {
            Ok(payload) => self.set(key, payload).await,
            Err(e) => {
                warn!(key = %key, error = %e, "Could not encode artist document for cache");
                false
            }
        }
    }

    pub(crate) async fn get_at(
        &self,
        key: &str,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Option<Value> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %key, "Cache miss: no entry");
                return None;
            }
            Err(e) => {
                debug!(
                    key = %key,
                    backend = self.store.name(),
                    error = %e,
                    "Cache read failed, treating as miss"
                );
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(key = %key, error = %e, "Cache entry unreadable, treating as miss");
                return None;
            }
        };

        if entry.key != key {
            debug!(
                key = %key,
                stored_key = %entry.key,
                "Cache entry key mismatch, treating as miss"
            );
            return None;
        }

        if !time::is_fresh(entry.stored_at, max_age, now) {
            debug!(key = %key, stored_at = %entry.stored_at, "Cache miss: entry is stale");
            return None;
        }

        debug!(key = %key, stored_at = %entry.stored_at, "Cache hit");
        Some(entry.payload)
    }

    pub(crate) async fn set_at(&self, key: &str, payload: Value, stored_at: DateTime<Utc>) -> bool {
        let entry = CacheEntry::new(key, payload, stored_at);
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "Could not encode cache entry");
                return false;
            }
        };

        match self.store.set(key, &raw).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    key = %key,
                    backend = self.store.name(),
                    error = %e,
                    "Cache write failed, value not persisted"
                );
                false
            }
        }
    }
}
