//! Configuration management for voxd.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::{APP_NAME, DEFAULT_SOCKET_PATH};

/// Configuration for the daemon.
///
/// Loaded from a TOML file in the user's configuration directory; every
/// field has a sensible default so a missing file is not an error.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Path of the Unix socket the command server listens on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_path: Option<PathBuf>,

    /// Whisper model to transcribe with (e.g. "small-q8")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Language hint for transcription (ISO 639-1 code)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Beam width used by the whisper decoder
    #[serde(
        default = "default_beam_size",
        skip_serializing_if = "is_default_beam_size"
    )]
    pub beam_size: u32,

    /// Directory to dump finished recordings into as WAV files, for
    /// debugging transcription quality. Disabled when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_recordings_dir: Option<PathBuf>,
}

fn default_beam_size() -> u32 {
    5
}

fn is_default_beam_size(v: &u32) -> bool {
    *v == 5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket_path: None,
            model: None,
            language: None,
            beam_size: default_beam_size(),
            save_recordings_dir: None,
        }
    }
}

impl Config {
    /// Get the socket path, falling back to the well-known default.
    pub fn socket_path(&self) -> &Path {
        self.socket_path
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_SOCKET_PATH))
    }

    /// Get the configured model name
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Get the language hint, defaulting to English.
    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or("en")
    }

    /// Get the recording dump directory, if enabled.
    pub fn save_recordings_dir(&self) -> Option<&Path> {
        self.save_recordings_dir.as_deref()
    }
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new ConfigManager with the default configuration directory.
    pub fn new() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Ok(Self { config_path })
    }

    /// Creates a new ConfigManager with a specified configuration directory.
    #[cfg(test)]
    pub fn with_config_dir<P: AsRef<Path>>(dir: P) -> Self {
        let config_path = dir.as_ref().join(format!("{}.toml", APP_NAME));
        Self { config_path }
    }

    /// Returns the default path to the configuration file.
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to retrieve configuration directory")?;
        Ok(config_dir.join(APP_NAME).join(format!("{}.toml", APP_NAME)))
    }

    /// Loads the configuration from the config file or returns default.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let config_content = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file at {:?}", self.config_path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file at {:?}", self.config_path))?;

        Ok(config)
    }

    /// Saves the configuration to the config file.
    pub fn save(&self, config: &Config) -> Result<()> {
        let config_dir = self
            .config_path
            .parent()
            .with_context(|| format!("Failed to get parent directory of {:?}", self.config_path))?;

        fs::create_dir_all(config_dir)
            .with_context(|| format!("Failed to create config directory at {:?}", config_dir))?;

        let serialized =
            toml::to_string_pretty(&config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, serialized)
            .with_context(|| format!("Failed to write config file at {:?}", self.config_path))?;

        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.model.is_none());
        assert_eq!(config.socket_path(), Path::new(DEFAULT_SOCKET_PATH));
        assert_eq!(config.language(), "en");
        assert_eq!(config.beam_size, 5);
        assert!(config.save_recordings_dir().is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            socket_path: Some(PathBuf::from("/tmp/voxd-test.sock")),
            model: Some("small-q8".to_string()),
            language: Some("de".to_string()),
            ..Default::default()
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(config.socket_path, deserialized.socket_path);
        assert_eq!(config.model, deserialized.model);
        assert_eq!(deserialized.language(), "de");
    }

    #[test]
    fn test_config_manager_save_load() {
        let temp_dir = std::env::temp_dir().join("voxd-test");
        fs::create_dir_all(&temp_dir).unwrap();

        let manager = ConfigManager::with_config_dir(&temp_dir);

        let config = Config {
            model: Some("tiny-q8".to_string()),
            beam_size: 3,
            ..Default::default()
        };

        manager.save(&config).unwrap();
        let loaded = manager.load().unwrap();

        assert_eq!(config.model, loaded.model);
        assert_eq!(loaded.beam_size, 3);

        // Cleanup
        fs::remove_dir_all(&temp_dir).ok();
    }
}
