//! Relocation defaults loaded from TOML configuration files.
//!
//! Every key is optional; anything left out falls back to the built-in
//! defaults, and command-line flags override whatever the file says.
//!
//! # Configuration File Format
//!
//! ```toml
//! [relocation]
//! destination = "00_SOLO_VIDEOS"
//! mode = "simulate"
//! action = "move"
//! extensions = ["mp4", "mkv", "mov"]
//! log_dir = "/home/me/Documents/SoloVideos/logs"
//! ```

use crate::extensions::{ExtensionSet, VideoFormat};
use crate::paths::DEFAULT_DEST_NAME;
use crate::request::{Action, Mode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_NAME: &str = ".solovideosrc.toml";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration in {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },

    /// IO error while reading configuration.
    #[error("IO error reading configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub relocation: RelocationDefaults,
}

/// Defaults for a relocation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelocationDefaults {
    /// Destination: absolute, relative to the source, or empty for the default folder.
    pub destination: String,
    pub mode: Mode,
    pub action: Action,
    /// Extensions to extract, with or without the leading dot.
    pub extensions: Vec<String>,
    /// Where run logs are written. `None` means the platform default.
    pub log_dir: Option<PathBuf>,
}

impl Default for RelocationDefaults {
    fn default() -> Self {
        Self {
            destination: DEFAULT_DEST_NAME.to_string(),
            mode: Mode::Simulate,
            action: Action::Move,
            extensions: VideoFormat::ALL
                .iter()
                .map(|format| format.extension().to_string())
                .collect(),
            log_dir: None,
        }
    }
}

impl RelocationDefaults {
    /// The configured extensions as a normalized set.
    pub fn extension_set(&self) -> ExtensionSet {
        ExtensionSet::parse(&self.extensions)
    }
}

impl Config {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.solovideosrc.toml` in the current directory
    /// 3. Look for `solovideos/config.toml` in the user configuration directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a file is found (or explicitly provided) but
    /// cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_NAME);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(user_config) = Self::user_config_path()
            && user_config.exists()
        {
            return Self::load_from_file(&user_config);
        }

        Ok(Self::default())
    }

    /// `<config_dir>/solovideos/config.toml`, if the platform has a config dir.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("solovideos").join("config.toml"))
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file does not exist,
    /// `ConfigError::Invalid` if TOML parsing fails and `ConfigError::Io` if
    /// the file cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_toml(&content).map_err(|reason| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }
}
