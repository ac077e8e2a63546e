//! Configuration loading and root folder resolution
//!
//! Bootstrap settings come from a small TOML file. Everything the visitor
//! changes at runtime (theme, filters, audio position) lives in the settings
//! store instead, see [`crate::storage`].
//!
//! Missing or unreadable configuration never stops startup: a warning is
//! logged and compiled defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable that overrides the root folder
pub const ROOT_FOLDER_ENV: &str = "FOLIO_ROOT_FOLDER";

/// Default search debounce in milliseconds
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 120;

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Content document location (file path or http(s) URL)
    #[serde(default = "default_content")]
    pub content: String,

    /// Settings database path (relative to root folder when not absolute)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Root folder for the settings database (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Coalescing delay for the global search box
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            content: default_content(),
            database_path: None,
            root_folder: None,
            search_debounce_ms: default_search_debounce_ms(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_content() -> String {
    "content/content.json".to_string()
}

fn default_search_debounce_ms() -> u64 {
    DEFAULT_SEARCH_DEBOUNCE_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load configuration, falling back to defaults on any failure
    ///
    /// An explicit path is tried first, then the per-user config file.
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        let candidate = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => user_config_file(),
        };

        let Some(path) = candidate else {
            info!("No config file found, using compiled defaults");
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Could not load config {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Settings database path resolved against the root folder
    pub fn database_path(&self, root_folder: &Path) -> PathBuf {
        match &self.database_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => root_folder.join(path),
            None => root_folder.join("folio.db"),
        }
    }
}

/// Root folder resolution in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config value
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Per-user config file, if one exists
fn user_config_file() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("folio").join("config.toml");
    path.exists().then_some(path)
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("folio"))
        .unwrap_or_else(|| PathBuf::from("./folio_data"))
}
