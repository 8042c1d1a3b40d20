//! Pipeline assembly from bootstrap configuration
//!
//! Builds the registry, cache backend, resolver, enrichment service and
//! mention extractor once at startup. The chat layer holds on to the
//! resulting [`Pipeline`] for the life of the process.

use crate::cache::{FileStore, FreshnessCache, KeyValueStore, MemoryStore, SqliteStore};
use crate::registry::ArtistRegistry;
use crate::services::{
    policy_for, ArtistResolver, ContextAssembler, EnrichmentService, HttpPageFetcher,
    LinkClassifier, MentionExtractor, NegativeCaching, PageFetcher, RateLimiter,
};
use nerdchat_common::config::{CacheBackend, TomlConfig};
use nerdchat_common::{Error, Result};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// SQLite cache file name inside the root folder
pub const CACHE_DB_FILE: &str = "nerdchat.db";

/// The two entry points the chat layer uses, plus the per-turn helper
pub struct Pipeline {
    pub registry: Arc<ArtistRegistry>,
    pub extractor: Arc<MentionExtractor>,
    pub enrichment: EnrichmentService,
    pub assembler: ContextAssembler,
}

/// Cache directory for the file backend
pub fn cache_directory(config: &TomlConfig, root_folder: &Path) -> PathBuf {
    config
        .cache
        .directory
        .clone()
        .unwrap_or_else(|| root_folder.join("cache"))
}

/// Open the configured cache backend
pub async fn open_store(config: &TomlConfig, root_folder: &Path) -> Result<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match config.cache.backend {
        CacheBackend::File => {
            let dir = cache_directory(config, root_folder);
            info!("Cache directory: {}", dir.display());
            Arc::new(FileStore::new(dir))
        }
        CacheBackend::Sqlite => {
            let db_path = root_folder.join(CACHE_DB_FILE);
            info!("Cache database: {}", db_path.display());
            let store = SqliteStore::open(&db_path)
                .await
                .map_err(|e| Error::Internal(format!("Open cache database failed: {}", e)))?;
            Arc::new(store)
        }
        CacheBackend::Memory => {
            info!("Cache backend: memory (not persisted)");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}

/// Full production pipeline: configured store and a real HTTP fetcher
pub async fn build_pipeline(config: &TomlConfig, root_folder: &Path) -> Result<Pipeline> {
    let store = open_store(config, root_folder).await?;

    let user_agent = config
        .source
        .user_agent
        .as_deref()
        .unwrap_or(crate::services::page_fetcher::USER_AGENT);
    let fetcher = HttpPageFetcher::new(Duration::from_secs(config.source.timeout_secs), user_agent)
        .map_err(|e| Error::Config(format!("HTTP client setup failed: {}", e)))?;

    build_pipeline_with(config, store, Arc::new(fetcher))
}

/// Pipeline over an explicit store and fetcher
pub fn build_pipeline_with(
    config: &TomlConfig,
    store: Arc<dyn KeyValueStore>,
    fetcher: Arc<dyn PageFetcher>,
) -> Result<Pipeline> {
    config.validate()?;

    let registry = Arc::new(ArtistRegistry::from_config(&config.artists_or_seed()));
    info!(artists = registry.len(), "Artist registry loaded");

    let requests_per_minute = NonZeroU32::new(config.source.requests_per_minute).ok_or_else(|| {
        Error::Config("source.requests_per_minute must be a positive integer".to_string())
    })?;
    let rate_limiter = RateLimiter::new(requests_per_minute);
    info!(
        requests_per_minute = requests_per_minute.get(),
        min_interval_ms = rate_limiter.min_interval().as_millis() as u64,
        base_url = %config.source.base_url,
        "External source configured"
    );

    let classifier = config
        .links
        .as_ref()
        .map(LinkClassifier::from_config)
        .unwrap_or_default();

    let resolver = ArtistResolver::new(
        Arc::clone(&registry),
        fetcher,
        rate_limiter,
        config.source.base_url.clone(),
    )
    .with_classifier(classifier);

    let cache = FreshnessCache::new(store);
    info!(
        backend = cache.backend(),
        max_age_hours = config.cache.max_age_hours,
        "Freshness cache ready"
    );

    let enrichment = EnrichmentService::new(cache, Arc::new(resolver))
        .with_negative_caching(NegativeCaching::from(config.cache.negative_caching))
        .with_default_max_age_hours(config.cache.max_age_hours);

    let extractor = Arc::new(MentionExtractor::with_policy(
        Arc::clone(&registry),
        policy_for(config.matching.strategy),
    ));

    let assembler = ContextAssembler::new(Arc::clone(&extractor), enrichment.clone())
        .with_max_chars(config.context.max_chars);

    Ok(Pipeline {
        registry,
        extractor,
        enrichment,
        assembler,
    })
}
