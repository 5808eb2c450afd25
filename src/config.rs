use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MemliveConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub memory: MemoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MemoryConfig {
    /// Rows per listing page.
    pub page_size: usize,
    /// Maximum rows a search returns.
    pub search_limit: usize,
    pub default_importance: f64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_memlive_dir()
            .join("memlive.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            search_limit: 20,
            default_importance: 0.5,
        }
    }
}

/// Returns `~/.memlive/`
pub fn default_memlive_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".memlive")
}

/// Returns the default config file path: `~/.memlive/config.toml`
pub fn default_config_path() -> PathBuf {
    default_memlive_dir().join("config.toml")
}

impl MemliveConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            MemliveConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (MEMLIVE_DB, MEMLIVE_LOG_LEVEL, MEMLIVE_PAGE_SIZE).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MEMLIVE_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("MEMLIVE_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("MEMLIVE_PAGE_SIZE") {
            match val.parse() {
                Ok(size) => self.memory.page_size = size,
                Err(_) => warn!(value = %val, "ignoring invalid MEMLIVE_PAGE_SIZE"),
            }
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
