//! Persisted cache entry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One durable cache record
///
/// `stored_at` is the write time; staleness is computed from it on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub stored_at: DateTime<Utc>,
    pub payload: Value,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, payload: Value, stored_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            stored_at,
            payload,
        }
    }
}
