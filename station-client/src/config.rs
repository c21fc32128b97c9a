//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend origin every request is sent to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session file; defaults to the per-user data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// Defaults
fn default_base_url() -> String { "http://localhost:8000".to_string() }
fn default_timeout_secs() -> u64 { 30 }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Load from a TOML file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Where the session file lives when no explicit path is configured.
    pub fn session_path(&self) -> PathBuf {
        self.session.path.clone().unwrap_or_else(default_session_path)
    }
}

/// `<user data dir>/digital-police-station/session.json`, or `./session.json`
/// when the platform has no data directory.
pub fn default_session_path() -> PathBuf {
    let app_dir = app_dirs2::app_root(
        app_dirs2::AppDataType::UserData,
        &app_dirs2::AppInfo {
            name: "digital-police-station",
            author: "Digital Police Station",
        },
    );
    match app_dir {
        Ok(dir) => dir.join("session.json"),
        Err(e) => {
            tracing::warn!("No user data directory ({}), using working directory", e);
            PathBuf::from("session.json")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.session.path.is_none());
    }

    #[test]
    fn test_config_with_all_fields() {
        let config = ClientConfig::from_toml_str(
            r#"
[api]
base_url = "https://station.example.gov"
timeout_secs = 5

[session]
path = "/tmp/station-session.json"
"#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://station.example.gov");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(
            config.session_path(),
            PathBuf::from("/tmp/station-session.json")
        );
    }

    #[test]
    fn test_partial_api_section() {
        let config = ClientConfig::from_toml_str("[api]\ntimeout_secs = 2\n").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout_secs, 2);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(ClientConfig::from_toml_str("[api\nbase_url = 1").is_err());
    }
}
