//! Key-value store abstraction behind the freshness cache
//!
//! The cache only needs get/set/exists on opaque string values, so the
//! durability mechanism can change (files, SQLite, memory) without touching
//! the orchestration code.

use crate::error::StoreResult;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// Durable key → string value store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Read the value stored under `key`, `None` when absent
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Whether a value exists under `key`
    async fn exists(&self, key: &str) -> StoreResult<bool>;
}

// ============================================================================
// File backend
// ============================================================================

/// Distinguishes temp files of concurrent writers within one process
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// One JSON file per key
///
/// Files are written to a temp name and renamed into place, so readers
/// never observe a partial write. The directory is created on first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let target = self.path_for(key);
        let temp = self.dir.join(format!(
            ".{}.{}.{}.tmp",
            encode_key(key),
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        if let Err(e) = tokio::fs::write(&temp, value).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&temp, &target).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }

        debug!(key = %key, path = %target.display(), "Wrote cache file");
        Ok(())
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        match tokio::fs::metadata(self.path_for(key)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Longest stem written as-is; leaves room for the temp-file decoration
/// inside a 255-byte file name
const MAX_STEM_LEN: usize = 180;

/// Encoded prefix kept in front of the digest for long keys
const LONG_STEM_PREFIX_LEN: usize = 100;

/// Encode a key as a file name stem
///
/// `[a-z0-9_-]` pass through, every other byte becomes `%XX`. Distinct keys
/// always map to distinct names, and nothing can escape the cache directory.
/// Stems longer than [`MAX_STEM_LEN`] are cut down to a readable prefix plus
/// `~` and the SHA-256 of the full key; `~` never appears in a short stem.
pub fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' => encoded.push(byte as char),
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }

    if encoded.len() <= MAX_STEM_LEN {
        return encoded;
    }

    // Encoded text is ASCII, so any byte index is a char boundary
    encoded.truncate(LONG_STEM_PREFIX_LEN);
    encoded.push('~');
    encoded.push_str(&format!("{:x}", Sha256::digest(key.as_bytes())));
    encoded
}

// ============================================================================
// Memory backend
// ============================================================================

/// Process-local map; nothing survives a restart
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.entries.read().await.contains_key(key))
    }
}
