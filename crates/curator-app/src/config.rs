//! Settings file handling.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use curator_core::{HashingConfig, RetryConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Region whose restrictions decide availability when none is configured.
pub const DEFAULT_REGION: &str = "FR";

/// Pause before each move when none is configured.
pub const DEFAULT_PACING_MS: u64 = 1_000;

/// Application configuration, stored as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Region code used for availability checks.
    pub region: String,
    /// Authorized-user credentials file.
    pub credentials_path: Option<PathBuf>,
    /// Where raw API responses are written, if anywhere.
    pub debug_dir: Option<PathBuf>,
    /// Root folder of playlist backups.
    pub backup_dir: PathBuf,
    /// Pause before each move, in milliseconds.
    pub pacing_ms: u64,
    pub retry: RetryConfig,
    pub hashing: HashingConfig,
    /// yt-dlp binary; looked up on `PATH` when unset.
    pub yt_dlp_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let dirs = project_dirs();
        Self {
            region: DEFAULT_REGION.to_string(),
            credentials_path: dirs
                .as_ref()
                .map(|d| d.config_dir().join("credentials.json")),
            debug_dir: None,
            backup_dir: dirs
                .as_ref()
                .map_or_else(|| PathBuf::from("backup"), |d| d.data_dir().join("backup")),
            pacing_ms: DEFAULT_PACING_MS,
            retry: RetryConfig::default(),
            hashing: HashingConfig::default(),
            yt_dlp_path: None,
        }
    }
}

impl AppConfig {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write to `path` as pretty JSON, creating parent folders.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "curator")
}

/// `<config dir>/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.json"))
}
