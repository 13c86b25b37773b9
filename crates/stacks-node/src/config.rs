//! Node configuration

use serde::{Deserialize, Serialize};
use stacks_core::{ALLOWED_FILE_TYPES, MAX_FILE_SIZE};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upload rules
    pub library: LibraryConfig,

    /// Search defaults
    pub search: SearchConfig,

    /// Reputation gates
    pub access: AccessConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Largest accepted file in bytes
    pub max_file_size: u64,
    /// Accepted extensions, with leading dot
    pub allowed_extensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Page size when a query does not give one
    pub default_page_size: usize,
    /// Maximum suggestions returned
    pub max_suggestions: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Minimum score needed to download, if any
    pub download_min_score: Option<i64>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            allowed_extensions: ALLOWED_FILE_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_page_size: stacks_index::search::DEFAULT_PAGE_SIZE,
            max_suggestions: stacks_index::search::MAX_SUGGESTIONS,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults
    pub fn load_or_default(path: &std::path::Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Write the default config to `path`, creating parent directories.
    /// Returns `false` without touching anything if a file is already there.
    pub async fn write_default(path: &std::path::Path) -> anyhow::Result<bool> {
        if tokio::fs::try_exists(path).await? {
            return Ok(false);
        }

        if let Some(dir) = path.parent() {
            if !tokio::fs::try_exists(dir).await? {
                tokio::fs::create_dir_all(dir).await?;
                tracing::info!("Created config directory: {}", dir.display());
            }
        }

        let toml = toml::to_string_pretty(&Self::default())?;
        tokio::fs::write(path, toml).await?;
        Ok(true)
    }
}

/// Expand a leading `~/` to the home directory
pub fn expand_path(path: &str) -> std::path::PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    std::path::PathBuf::from(path)
}
