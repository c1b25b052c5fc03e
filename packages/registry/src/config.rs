//! Reviewpad configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("Reviewpad config not found")]
    NotFound,

    /// Failed to read config file.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse config file.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings shared by the registry, the command layer and the exporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Base directory for relative file paths.
    pub workspace_root: Option<PathBuf>,
    /// Author name used when nothing better can be resolved.
    pub fallback_author: String,
    /// Label carried by comments written while a thread is a draft.
    pub pending_label: String,
    /// Top-level heading of markdown exports.
    pub export_title: String,

    /// Path this config was loaded from.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            workspace_root: None,
            fallback_author: "Anonymous".to_string(),
            pending_label: "pending".to_string(),
            export_title: "Code Review Comments".to_string(),
            config_path: None,
        }
    }
}

impl ReviewConfig {
    /// Find and load the global config.
    ///
    /// Searches in order:
    /// 1. `$XDG_CONFIG_HOME/reviewpad/config.json`
    /// 2. `~/.config/reviewpad/config.json`
    ///
    /// # Errors
    ///
    /// Returns an error if no config is found or parsing fails.
    pub fn load_global() -> Result<Self, ConfigError> {
        Self::load_first(Self::config_candidates().into_iter().flatten())
    }

    /// Load the first of `candidates` that exists.
    fn load_first(candidates: impl IntoIterator<Item = PathBuf>) -> Result<Self, ConfigError> {
        for path in candidates {
            if path.exists() {
                log::debug!("Loading Reviewpad config from: {}", path.display());
                return Self::load_from_path(&path);
            }
        }

        Err(ConfigError::NotFound)
    }

    /// Load the global config, falling back to defaults if there is none.
    ///
    /// A config file that exists but can't be read is logged and ignored.
    #[must_use]
    pub fn load_or_default() -> Self {
        Self::or_default(Self::load_global())
    }

    fn or_default(loaded: Result<Self, ConfigError>) -> Self {
        match loaded {
            Ok(config) => config,
            Err(ConfigError::NotFound) => Self::default(),
            Err(e) => {
                log::warn!("Ignoring Reviewpad config: {e}");
                Self::default()
            }
        }
    }

    fn config_candidates() -> Vec<Option<PathBuf>> {
        vec![
            dirs::config_dir().map(|p| p.join("reviewpad/config.json")),
            dirs::home_dir().map(|p| p.join(".config/reviewpad/config.json")),
        ]
    }

    /// Load config from a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or isn't valid config JSON.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    #[must_use]
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }
}
