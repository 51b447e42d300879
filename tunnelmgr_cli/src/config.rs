//! CLI configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tunnelmgr_common::constants;

/// Get the configuration directory path
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tunnelmgr")
    }

    #[cfg(not(target_os = "windows"))]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tunnelmgr")
    }
}

/// Get the config file path
pub fn config_file() -> PathBuf {
    config_dir().join("config.yml")
}

/// Get the logs directory
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}

/// Log file used while a full-screen view owns the terminal
pub fn tui_log_file() -> PathBuf {
    logs_dir().join("tunnelmgr.log")
}

/// Ensure all config directories exist
pub fn ensure_dirs() -> Result<()> {
    let config = config_dir();
    let logs = logs_dir();

    fs::create_dir_all(&config).context("Failed to create config directory")?;
    fs::create_dir_all(&logs).context("Failed to create logs directory")?;

    Ok(())
}

/// Main configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL (default: http://127.0.0.1:5000)
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// API mount point, also the password of the backend's login form
    #[serde(default = "default_api_path")]
    pub api_path: String,

    /// Subscription password the backend was started with
    #[serde(default)]
    pub subscription_password: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Re-fetch the tunnel list every N seconds while the dashboard is open
    #[serde(default)]
    pub refresh_secs: Option<u64>,
}

fn default_server_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_api_path() -> String {
    "api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            api_path: default_api_path(),
            subscription_password: String::new(),
            timeout_secs: default_timeout_secs(),
            refresh_secs: None,
        }
    }
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server_url: Option<String>,
    pub api_path: Option<String>,
    pub subscription_password: Option<String>,
    pub refresh_secs: Option<u64>,
}

impl Config {
    /// Load config from the default file
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file())
    }

    /// Load config from `path`, falling back to defaults when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save config to the default file
    pub fn save(&self) -> Result<()> {
        ensure_dirs()?;
        self.save_to(&config_file())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Apply command line and environment overrides
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(url) = overrides.server_url {
            self.server_url = url;
        }
        if let Some(path) = overrides.api_path {
            self.api_path = path;
        }
        if let Some(password) = overrides.subscription_password {
            self.subscription_password = password;
        }
        if overrides.refresh_secs.is_some() {
            self.refresh_secs = overrides.refresh_secs;
        }
        self
    }

    /// Base URL of the API mount, e.g. `http://127.0.0.1:5000/api`
    pub fn api_base(&self) -> String {
        join_url(&self.server_url, &self.api_path)
    }

    /// Base URL of the subscription export
    pub fn subscription_base(&self) -> String {
        join_url(&self.server_url, &subscription_path(&self.subscription_password))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Path segment the backend serves the subscription under
///
/// The backend replaces passwords shorter than 16 characters with their
/// SHA-256 hex digest, so the client derives the same segment.
pub fn subscription_path(password: &str) -> String {
    if password.len() < constants::MIN_SUBSCRIPTION_PASSWORD_LEN {
        hex::encode(Sha256::digest(password.as_bytes()))
    } else {
        password.to_string()
    }
}

fn join_url(base: &str, segment: &str) -> String {
    let base = base.trim_end_matches('/');
    let segment = segment.trim_matches('/');
    if segment.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.yml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api_base(), "http://127.0.0.1:5000/api");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");

        let config = Config {
            server_url: "https://tunnels.example.com/".to_string(),
            api_path: "/secret-api/".to_string(),
            refresh_secs: Some(30),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.api_base(), "https://tunnels.example.com/secret-api");
        assert_eq!(loaded.refresh_interval(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "api_path: hidden\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_path, "hidden");
        assert_eq!(config.server_url, default_server_url());
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_overrides() {
        let config = Config::default().with_overrides(Overrides {
            server_url: Some("http://10.0.0.2:8000".to_string()),
            refresh_secs: Some(0),
            ..Overrides::default()
        });
        assert_eq!(config.api_base(), "http://10.0.0.2:8000/api");
        assert_eq!(config.refresh_interval(), None);
    }

    #[test]
    fn test_subscription_path() {
        // sha256("")
        assert_eq!(
            subscription_path(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(subscription_path("LongEnoughPassw0rd"), "LongEnoughPassw0rd");

        let config = Config {
            subscription_password: "LongEnoughPassw0rd".to_string(),
            ..Config::default()
        };
        assert_eq!(config.subscription_base(), "http://127.0.0.1:5000/LongEnoughPassw0rd");
    }
}
