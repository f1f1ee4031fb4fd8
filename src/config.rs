//! Runtime configuration loaded from a TOML file.
//!
//! The file is optional: every field has a default, and a missing file yields
//! [`Config::default`]. Lookup order for the file path is the `DOCSEARCH_CONFIG`
//! environment variable, then `<config dir>/docsearch/config.toml`.

use crate::error::Result;
use anyhow::Context;
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "DOCSEARCH_CONFIG";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub index: IndexConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Partition files or directories loaded at startup.
    pub sources: Vec<PathBuf>,
    /// Where to persist the built index. No snapshot is written when unset.
    pub snapshot: Option<PathBuf>,
    pub load_timeout_secs: u64,
    /// Number of previously loaded indices kept in memory by the server.
    pub cached_indices: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            snapshot: None,
            load_timeout_secs: 30,
            cached_indices: 4,
        }
    }
}

impl IndexConfig {
    pub const fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub default_limit: usize,
    pub suggestion_limit: usize,
    /// Jaro-Winkler similarity (0.0 to 1.0) a keyword needs to be suggested.
    pub min_similarity: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            suggestion_limit: 5,
            min_similarity: 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl Config {
    /// Parse a config from TOML text, expanding `~` in every path.
    pub fn from_toml(text: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(text).context("Invalid docsearch config")?;
        config.index.sources = config
            .index
            .sources
            .iter()
            .map(|p| expand_tilde_path(p))
            .collect();
        config.index.snapshot = config.index.snapshot.as_deref().map(expand_tilde_path);
        Ok(config)
    }

    /// Read a config file. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text)
                .with_context(|| format!("Failed to parse config at {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read config at {}", path.display())),
        }
    }

    /// Load the config from the default location.
    pub fn discover() -> Result<Self> {
        match default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }
}

/// Resolve the config file path from the environment or the user config directory.
pub fn default_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(expand_tilde(&explicit).into_owned()));
    }
    dirs::config_dir().map(|dir| dir.join("docsearch").join("config.toml"))
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/foo` becomes `/home/user/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
///
/// Returns `Cow::Borrowed` if no expansion needed, `Cow::Owned` if expanded.
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}

fn expand_tilde_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(text) => PathBuf::from(expand_tilde(text).into_owned()),
        None => path.to_path_buf(),
    }
}
