//! Configuration management for Keyscribe.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a partial TOML file only
//! needs to name the values it changes.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Keyscribe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input artifact paths
    pub general: GeneralConfig,

    /// Processing settings
    pub processing: ProcessingConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Keyword vectorization settings
    pub keywords: KeywordsConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.keyscribe.keyscribe/config.toml
    /// - Linux: ~/.config/keyscribe/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\keyscribe\config\config.toml
    ///
    /// Falls back to ~/.keyscribe/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "keyscribe", "keyscribe")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".keyscribe").join("config.toml")
            })
    }

    /// Resolved decoder model path (with ~ expansion).
    pub fn model_path(&self) -> PathBuf {
        expand(&self.general.model_path)
    }

    /// Resolved vocabulary artifact path (with ~ expansion).
    pub fn vocab_path(&self) -> PathBuf {
        expand(&self.general.vocab_path)
    }

    /// Resolved dictionary table path (with ~ expansion).
    pub fn dictionary_path(&self) -> PathBuf {
        expand(&self.general.dictionary_path)
    }

    /// Resolved caption table path (with ~ expansion).
    pub fn caption_path(&self) -> PathBuf {
        expand(&self.general.caption_path)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.processing.parallel_workers, 2);
        assert_eq!(config.processing.batch_size, 128);
        assert_eq!(config.processing.num_epochs, 5);
        assert_eq!(config.limits.max_decode_len, 20);
        assert_eq!(config.keywords.unknown, UnknownKeywordPolicy::Fatal);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[processing]"));
        assert!(toml.contains("[limits]"));
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[processing]\nbatch_size = 16\n\n[keywords]\nunknown = \"ignore\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.processing.batch_size, 16);
        assert_eq!(config.processing.num_epochs, 5);
        assert_eq!(config.keywords.unknown, UnknownKeywordPolicy::Ignore);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[processing]\nparallel_workers = 0").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_tilde_expansion() {
        let mut config = Config::default();
        config.general.vocab_path = PathBuf::from("~/vocab.json");
        assert!(config.vocab_path().ends_with("vocab.json"));
        assert_eq!(config.caption_path(), PathBuf::from("data/captions.csv"));
    }
}
