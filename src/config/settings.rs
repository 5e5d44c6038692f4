//! Settings file management.
//!
//! Loads `~/.opsboard/config.json`. Every setting resolves with
//! the same priority: environment variable > config file > built-in default.

use crate::aggregate::DEFAULT_WINDOW_DAYS;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default CentralReach API root.
pub const DEFAULT_CENTRALREACH_URL: &str = "https://partners-api.centralreach.com/enterprise/v1";

/// CentralReach connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CentralReachSettings {
    pub base_url: Option<String>,
    pub token: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Opsboard configuration file structure.
///
/// Stored at `~/.opsboard/config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpsboardConfig {
    /// Trailing window for "completed recently" counts
    pub completion_window_days: Option<i64>,
    pub centralreach: Option<CentralReachSettings>,
}

/// Get the config file path.
fn config_path() -> Result<PathBuf> {
    super::global_opsboard_dir()
        .map(|dir| dir.join("config.json"))
        .ok_or(Error::Config("Could not determine home directory".into()))
}

/// Load configuration from an explicit path. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<OpsboardConfig> {
    if !path.exists() {
        return Ok(OpsboardConfig::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))
}

/// Load the user's configuration.
pub fn load_config() -> Result<OpsboardConfig> {
    load_config_from(&config_path()?)
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Resolve the completion window in days.
///
/// Priority: `OPSBOARD_WINDOW_DAYS` > config > 7.
pub fn resolve_window_days(config: &OpsboardConfig) -> i64 {
    if let Some(days) = env_value("OPSBOARD_WINDOW_DAYS").and_then(|v| v.parse::<i64>().ok()) {
        if days >= 0 {
            return days;
        }
        tracing::warn!(days, "ignoring negative OPSBOARD_WINDOW_DAYS");
    }

    config
        .completion_window_days
        .filter(|d| *d >= 0)
        .unwrap_or(DEFAULT_WINDOW_DAYS)
}

/// Resolve the CentralReach base URL (no trailing slash).
pub fn resolve_centralreach_base_url(config: &OpsboardConfig) -> String {
    let url = env_value("CENTRALREACH_BASE_URL")
        .or_else(|| config.centralreach.as_ref().and_then(|c| c.base_url.clone()))
        .unwrap_or_else(|| DEFAULT_CENTRALREACH_URL.to_string());
    url.trim_end_matches('/').to_string()
}

/// Resolve the CentralReach bearer token, if any.
pub fn resolve_centralreach_token(config: &OpsboardConfig) -> Option<String> {
    env_value("CENTRALREACH_TOKEN")
        .or_else(|| config.centralreach.as_ref().and_then(|c| c.token.clone()))
}

/// Resolve the CentralReach request timeout in seconds.
pub fn resolve_centralreach_timeout(config: &OpsboardConfig) -> u64 {
    config
        .centralreach
        .as_ref()
        .and_then(|c| c.timeout_secs)
        .unwrap_or(30)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config_from(&temp_dir.path().join("config.json")).unwrap();
        assert_eq!(config, OpsboardConfig::default());
    }

    #[test]
    fn test_config_file_uses_camel_case() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"completionWindowDays": 14, "centralreach": {"baseUrl": "https://cr.example.test/api/", "token": "secret"}}"#,
        )
        .unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.completion_window_days, Some(14));
        let cr = loaded.centralreach.unwrap();
        assert_eq!(cr.base_url.as_deref(), Some("https://cr.example.test/api/"));
        assert_eq!(cr.token.as_deref(), Some("secret"));
        assert_eq!(cr.timeout_secs, None);
    }

    #[test]
    fn test_invalid_config_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_config_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_config_values_used_without_env() {
        // Only meaningful when the environment does not override; the
        // override variables are not set in the test environment.
        if std::env::var("CENTRALREACH_BASE_URL").is_ok() || std::env::var("OPSBOARD_WINDOW_DAYS").is_ok() {
            return;
        }
        let config = OpsboardConfig {
            completion_window_days: Some(3),
            centralreach: Some(CentralReachSettings {
                base_url: Some("https://cr.example.test/api/".to_string()),
                token: None,
                timeout_secs: Some(5),
            }),
        };
        assert_eq!(resolve_window_days(&config), 3);
        assert_eq!(resolve_centralreach_base_url(&config), "https://cr.example.test/api");
        assert_eq!(resolve_centralreach_timeout(&config), 5);
        assert_eq!(resolve_window_days(&OpsboardConfig::default()), DEFAULT_WINDOW_DAYS);
    }
}
