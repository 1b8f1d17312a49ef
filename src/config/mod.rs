//! Client configuration
//!
//! Settings live in a RON file in the platform config directory. A missing
//! or broken file falls back to defaults so the client always starts.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::DEFAULT_API_URL;
use crate::roster::{SortDirection, SortKey};

/// Environment variable that overrides the configured API URL
pub const API_URL_ENV: &str = "INQUISITORIO_API_URL";

const CONFIG_FILE: &str = "config.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the ABM Express backend
    pub api_url: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Initial ordering of the user list
    pub default_sort_key: SortKey,
    pub default_sort_direction: SortDirection,
    /// Where log output goes (the terminal belongs to the UI)
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            default_sort_key: SortKey::Points,
            default_sort_direction: SortDirection::Descending,
            log_file: PathBuf::from("inquisitorio.log"),
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides.
    /// A broken file yields defaults plus the error, for logging once the
    /// logger is up.
    pub fn load() -> (Self, Option<ConfigError>) {
        let (mut config, warning) = Self::load_from(&config_path());
        config.apply_env_override(std::env::var(API_URL_ENV).ok());
        (config, warning)
    }

    /// Load from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> (Self, Option<ConfigError>) {
        match Self::read(path) {
            Ok(Some(config)) => (config, None),
            Ok(None) => (Self::default(), None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// `Ok(None)` when the file does not exist
    fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(config))
    }

    pub fn parse(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    fn apply_env_override(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Write this config as pretty RON
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "inquisitorio", "Inquisitorio") {
        proj_dirs.config_dir().join(CONFIG_FILE)
    } else {
        PathBuf::from(".").join(CONFIG_FILE)
    }
}

/// Write the default config to the config path so it can be edited
pub fn export_default_config() -> Result<PathBuf, ConfigError> {
    let path = config_path();
    Config::default().save_to(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("inquisitorio-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse(r#"(api_url: "http://localhost:4000", timeout_secs: 5)"#).unwrap();
        assert_eq!(config.api_url, "http://localhost:4000");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.default_sort_key, SortKey::Points);
        assert_eq!(config.log_file, PathBuf::from("inquisitorio.log"));
    }

    #[test]
    fn test_sort_preferences_parse() {
        let config = Config::parse("(default_sort_key: Name, default_sort_direction: Ascending)").unwrap();
        assert_eq!(config.default_sort_key, SortKey::Name);
        assert_eq!(config.default_sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn test_missing_file_is_silent() {
        let (config, warning) = Config::load_from(&temp_path("missing.ron"));
        assert_eq!(config, Config::default());
        assert!(warning.is_none());
    }

    #[test]
    fn test_broken_file_falls_back_with_warning() {
        let path = temp_path("broken.ron");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "(api_url: ").unwrap();
        let (config, warning) = Config::load_from(&path);
        assert_eq!(config, Config::default());
        let warning = warning.unwrap();
        assert!(matches!(warning, ConfigError::Parse { .. }));
        assert!(warning.to_string().contains("broken.ron"));
    }

    #[test]
    fn test_save_and_reload() {
        let path = temp_path("saved.ron");
        let config = Config {
            api_url: "http://example.test".into(),
            timeout_secs: 12,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        let (loaded, warning) = Config::load_from(&path);
        assert_eq!(loaded, config);
        assert!(warning.is_none());
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::default();
        config.apply_env_override(Some("   ".into()));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        config.apply_env_override(Some(" http://127.0.0.1:3000 ".into()));
        assert_eq!(config.api_url, "http://127.0.0.1:3000");
    }

    #[test]
    fn test_timeout_never_zero() {
        let config = Config { timeout_secs: 0, ..Config::default() };
        assert_eq!(config.timeout(), Duration::from_secs(1));
    }
}
