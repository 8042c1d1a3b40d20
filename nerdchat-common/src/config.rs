//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration is read once at startup. Sources, highest priority first:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. Built-in defaults (code constants)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "NERDCHAT_CONFIG";

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV_VAR: &str = "NERDCHAT_ROOT_FOLDER";

/// Environment variable overriding `source.requests_per_minute`
pub const REQUESTS_PER_MINUTE_ENV_VAR: &str = "NERDCHAT_REQUESTS_PER_MINUTE";

const DEFAULT_BASE_URL: &str = "https://www.musicnerd.xyz";

/// Courtesy limit towards the external source
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 10;

/// Hard timeout per artist page fetch
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Freshness window for cached artist documents
pub const DEFAULT_MAX_AGE_HOURS: u64 = 24;

/// Characters of page text per artist in a context block
pub const DEFAULT_CONTEXT_CHARS: usize = 4000;

/// Bootstrap configuration loaded from TOML file
///
/// Every section is optional; missing values fall back to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Root folder for cache files and the SQLite database
    pub root_folder: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub source: SourceConfig,
    pub cache: CacheConfig,
    pub matching: MatchingConfig,
    /// Link classification overrides (built-in rules when absent)
    pub links: Option<LinkRulesConfig>,
    pub context: ContextConfig,
    /// Curated artists; the only ones ever fetched from the external source
    pub artists: Vec<ArtistConfig>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// External artist source (MusicNerd)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    /// Courtesy limit towards the external origin
    pub requests_per_minute: u32,
    /// Hard timeout per fetch
    pub timeout_secs: u64,
    /// User-Agent override; a nerdchat identifier is used when absent
    pub user_agent: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

/// Durable backend for the freshness cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// One JSON file per artist
    #[default]
    File,
    /// One row per artist in an embedded SQLite database
    Sqlite,
    /// Process memory only (nothing survives a restart)
    Memory,
}

/// Freshness cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// Staleness window for cached artist documents
    pub max_age_hours: u64,
    /// Remember failed lookups for the freshness window
    pub negative_caching: bool,
    /// Cache directory for the file backend (defaults to `<root>/cache`)
    pub directory: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::File,
            max_age_hours: DEFAULT_MAX_AGE_HOURS,
            negative_caching: false,
            directory: None,
        }
    }
}

/// Artist mention matching strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Identifier anywhere in the text, including inside other words
    #[default]
    Substring,
    /// Identifier bounded by non-alphanumeric characters
    WholeWord,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub strategy: MatchStrategy,
}

/// Link classification markers, checked social first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkRulesConfig {
    pub social: Vec<String>,
    pub platform: Vec<String>,
}

/// Context block assembly
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Characters of page text included per artist
    pub max_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_CONTEXT_CHARS,
        }
    }
}

/// One curated artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistConfig {
    /// Display name (canonical capitalization)
    pub name: String,
    /// Opaque ID on the external source
    pub external_id: String,
    /// Lookup key; lower-cased `name` when absent
    #[serde(default)]
    pub identifier: Option<String>,
}

impl TomlConfig {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.source.base_url.trim().is_empty() {
            return Err(Error::Config("source.base_url must not be empty".to_string()));
        }
        if self.source.requests_per_minute == 0 {
            return Err(Error::Config(
                "source.requests_per_minute must be a positive integer".to_string(),
            ));
        }
        if self.source.timeout_secs == 0 {
            return Err(Error::Config("source.timeout_secs must be positive".to_string()));
        }
        if self.cache.max_age_hours == 0 {
            return Err(Error::Config("cache.max_age_hours must be positive".to_string()));
        }
        for artist in &self.artists {
            if artist.name.trim().is_empty() || artist.external_id.trim().is_empty() {
                return Err(Error::Config(format!(
                    "artist entry needs both name and external_id: {:?}",
                    artist
                )));
            }
        }
        Ok(())
    }

    /// Apply environment variable overrides on top of file values
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var(REQUESTS_PER_MINUTE_ENV_VAR) {
            let rpm = value.trim().parse::<u32>().map_err(|e| {
                Error::Config(format!(
                    "{}={:?} is not a number: {}",
                    REQUESTS_PER_MINUTE_ENV_VAR, value, e
                ))
            })?;
            info!(requests_per_minute = rpm, "Rate limit overridden from environment");
            self.source.requests_per_minute = rpm;
        }
        self.validate()
    }

    /// Artists to use: configured list, or the built-in seed when none are configured
    pub fn artists_or_seed(&self) -> Vec<ArtistConfig> {
        if self.artists.is_empty() {
            vec![ArtistConfig {
                name: "Latasha".to_string(),
                external_id: "3cd4c3e4-4bf4-4b92-9b72-07f9188bd4c6".to_string(),
                identifier: None,
            }]
        } else {
            self.artists.clone()
        }
    }
}

/// Read and validate a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    TomlConfig::from_toml_str(&content)
}

/// Write a TOML config file atomically (temp file, then rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp = path.with_extension("toml.tmp");
    if let Err(e) = std::fs::write(&temp, content) {
        let _ = std::fs::remove_file(&temp);
        return Err(e.into());
    }
    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(e.into());
    }
    Ok(())
}

/// Write a starter config listing every default and the seed artist
///
/// Refuses to replace an existing file unless `force` is set.
pub fn init_config_file(path: &Path, force: bool) -> Result<TomlConfig> {
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    let mut config = TomlConfig::default();
    config.artists = config.artists_or_seed();
    write_toml_config(&config, path)?;
    info!("Wrote starter config to {}", path.display());
    Ok(config)
}

/// Per-user config file location, whether or not it exists
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("nerdchat").join("config.toml"))
}

/// Load bootstrap configuration following the priority order
///
/// An explicitly named file (CLI or environment) must exist. The platform
/// default file is optional: when it is missing, built-in defaults are used.
pub fn load_config(cli_path: Option<&Path>) -> Result<TomlConfig> {
    let explicit = cli_path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from));

    let mut config = match explicit {
        Some(path) => {
            info!("Loading config from {}", path.display());
            load_toml_config(&path)?
        }
        None => match find_config_file() {
            Some(path) => {
                info!("Loading config from {}", path.display());
                load_toml_config(&path)?
            }
            None => {
                debug!("No config file found, using built-in defaults");
                TomlConfig::default()
            }
        },
    };

    config.apply_env_overrides()?;
    Ok(config)
}

/// Root folder resolution:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
        warn!("{} is set but empty, ignoring", ROOT_FOLDER_ENV_VAR);
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Locate the platform config file, if one exists
fn find_config_file() -> Option<PathBuf> {
    if let Some(path) = user_config_path() {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/nerdchat/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("nerdchat"))
        .unwrap_or_else(|| PathBuf::from("./nerdchat_data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.source.base_url, "https://www.musicnerd.xyz");
        assert_eq!(config.source.requests_per_minute, 10);
        assert_eq!(config.source.timeout_secs, 5);
        assert_eq!(config.cache.max_age_hours, 24);
        assert_eq!(config.cache.backend, CacheBackend::File);
        assert!(!config.cache.negative_caching);
        assert_eq!(config.matching.strategy, MatchStrategy::Substring);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let config = TomlConfig::from_toml_str(
            r#"
            root_folder = "/srv/nerdchat"

            [logging]
            level = "debug"

            [source]
            base_url = "http://localhost:8080"
            requests_per_minute = 30

            [cache]
            backend = "sqlite"
            max_age_hours = 6
            negative_caching = true

            [matching]
            strategy = "whole_word"

            [links]
            social = ["instagram"]
            platform = ["spotify"]

            [[artists]]
            name = "Disclosure"
            external_id = "abc"

            [[artists]]
            name = "Fred again.."
            identifier = "fred again"
            external_id = "def"
            "#,
        )
        .unwrap();

        assert_eq!(config.root_folder, Some(PathBuf::from("/srv/nerdchat")));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.source.base_url, "http://localhost:8080");
        assert_eq!(config.source.requests_per_minute, 30);
        // Unspecified fields in a present section keep defaults
        assert_eq!(config.source.timeout_secs, 5);
        assert_eq!(config.cache.backend, CacheBackend::Sqlite);
        assert_eq!(config.cache.max_age_hours, 6);
        assert!(config.cache.negative_caching);
        assert_eq!(config.matching.strategy, MatchStrategy::WholeWord);
        let links = config.links.unwrap();
        assert_eq!(links.social, vec!["instagram"]);
        assert_eq!(links.platform, vec!["spotify"]);
        assert_eq!(config.artists.len(), 2);
        assert_eq!(config.artists[1].identifier.as_deref(), Some("fred again"));
    }

    #[test]
    fn test_rejects_zero_rate() {
        let err = TomlConfig::from_toml_str("[source]\nrequests_per_minute = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_zero_max_age() {
        let err = TomlConfig::from_toml_str("[cache]\nmax_age_hours = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_unknown_backend() {
        let err = TomlConfig::from_toml_str("[cache]\nbackend = \"redis\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_incomplete_artist() {
        let err = TomlConfig::from_toml_str("[[artists]]\nname = \"Bicep\"\nexternal_id = \"\"\n")
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_seed_artist_when_none_configured() {
        let config = TomlConfig::default();
        let artists = config.artists_or_seed();
        assert_eq!(artists.len(), 1);
        assert_eq!(artists[0].name, "Latasha");
        assert_eq!(artists[0].external_id, "3cd4c3e4-4bf4-4b92-9b72-07f9188bd4c6");
    }

    #[test]
    fn test_write_then_load_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = TomlConfig::default();
        config.source.requests_per_minute = 42;
        config.artists.push(ArtistConfig {
            name: "Bicep".to_string(),
            external_id: "b1".to_string(),
            identifier: None,
        });

        write_toml_config(&config, &path).unwrap();
        let loaded = load_toml_config(&path).unwrap();
        assert_eq!(loaded.source.requests_per_minute, 42);
        assert_eq!(loaded.artists, config.artists);
    }

    #[test]
    fn test_init_config_writes_loadable_starter() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nerdchat").join("config.toml");

        let written = init_config_file(&path, false).unwrap();
        assert_eq!(written.artists.len(), 1);

        let loaded = load_toml_config(&path).unwrap();
        assert_eq!(loaded.artists, written.artists);
        assert_eq!(loaded.source.requests_per_minute, DEFAULT_REQUESTS_PER_MINUTE);
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_init_config_keeps_existing_file_unless_forced() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[source]\nrequests_per_minute = 3\n").unwrap();

        let err = init_config_file(&path, false).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(load_toml_config(&path).unwrap().source.requests_per_minute, 3);

        init_config_file(&path, true).unwrap();
        assert_eq!(
            load_toml_config(&path).unwrap().source.requests_per_minute,
            DEFAULT_REQUESTS_PER_MINUTE
        );
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides_rate() {
        std::env::set_var(REQUESTS_PER_MINUTE_ENV_VAR, "60");
        let mut config = TomlConfig::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.source.requests_per_minute, 60);

        std::env::set_var(REQUESTS_PER_MINUTE_ENV_VAR, "lots");
        assert!(config.apply_env_overrides().is_err());

        std::env::set_var(REQUESTS_PER_MINUTE_ENV_VAR, "0");
        assert!(config.apply_env_overrides().is_err());

        std::env::remove_var(REQUESTS_PER_MINUTE_ENV_VAR);
    }

    #[test]
    #[serial]
    fn test_root_folder_priority() {
        let mut config = TomlConfig::default();
        config.root_folder = Some(PathBuf::from("/from/toml"));

        std::env::set_var(ROOT_FOLDER_ENV_VAR, "/from/env");
        assert_eq!(
            resolve_root_folder(Some(Path::new("/from/cli")), &config),
            PathBuf::from("/from/cli")
        );
        assert_eq!(resolve_root_folder(None, &config), PathBuf::from("/from/env"));

        std::env::remove_var(ROOT_FOLDER_ENV_VAR);
        assert_eq!(resolve_root_folder(None, &config), PathBuf::from("/from/toml"));

        config.root_folder = None;
        let fallback = resolve_root_folder(None, &config);
        assert!(fallback.ends_with("nerdchat") || fallback == PathBuf::from("./nerdchat_data"));
    }

    #[test]
    #[serial]
    fn test_load_config_from_env_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[source]\nrequests_per_minute = 12\n").unwrap();

        std::env::set_var(CONFIG_ENV_VAR, &path);
        let config = load_config(None).unwrap();
        std::env::remove_var(CONFIG_ENV_VAR);

        assert_eq!(config.source.requests_per_minute, 12);
    }
}
