//! Configuration management.
//!
//! This module provides functions for discovering the Opsboard data
//! directory and loading user settings.
//!
//! # Layout
//!
//! - **Data**: JSONL record files (`tasks.jsonl`, `experiments.jsonl`,
//!   `roles.jsonl`, `permissions.jsonl`) in a data directory
//! - **Settings**: `~/.opsboard/config.json`
//!
//! A project can keep its own `.opsboard/` directory next to its sources;
//! otherwise the global `~/.opsboard/data` is used.

mod settings;

pub use settings::{
    load_config, load_config_from, resolve_centralreach_base_url, resolve_centralreach_timeout,
    resolve_centralreach_token, resolve_window_days, CentralReachSettings,
    OpsboardConfig, DEFAULT_CENTRALREACH_URL,
};

use std::path::{Path, PathBuf};

/// Name of the project-local data directory.
pub const PROJECT_DIR_NAME: &str = ".opsboard";

/// Discover a project-level `.opsboard/` directory.
///
/// Walks up from `start` looking for `.opsboard/`.
#[must_use]
pub fn discover_project_dir_from(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        let candidate = dir.join(PROJECT_DIR_NAME);
        if candidate.is_dir() {
            return Some(candidate);
        }

        match dir.parent() {
            Some(parent) => dir = parent,
            None => return None,
        }
    }
}

/// Discover a project-level `.opsboard/` directory from the current directory.
#[must_use]
pub fn discover_project_dir() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| discover_project_dir_from(&cwd))
}

/// Get the global Opsboard directory (`~/.opsboard/`).
#[must_use]
pub fn global_opsboard_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".opsboard"))
}

/// Resolve the data directory.
///
/// Priority:
/// 1. If `explicit_path` is provided, use it directly
/// 2. `OPSBOARD_DATA` environment variable
/// 3. Project-local `.opsboard/` found by walking up from the current directory
/// 4. Global location: `~/.opsboard/data`
#[must_use]
pub fn resolve_data_dir(explicit_path: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Explicit path from CLI flag
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    // Priority 2: OPSBOARD_DATA environment variable
    if let Ok(dir) = std::env::var("OPSBOARD_DATA") {
        if !dir.trim().is_empty() {
            return Some(PathBuf::from(dir));
        }
    }

    // Priority 3: project-local directory
    if let Some(dir) = discover_project_dir() {
        return Some(dir);
    }

    // Priority 4: global data directory
    global_opsboard_dir().map(|dir| dir.join("data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_data_dir_with_explicit() {
        let explicit = PathBuf::from("/custom/opsboard");
        assert_eq!(resolve_data_dir(Some(&explicit)), Some(explicit));
    }

    #[test]
    fn test_resolve_data_dir_falls_back() {
        assert!(resolve_data_dir(None).is_some());
    }

    #[test]
    fn test_discover_project_dir_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join(PROJECT_DIR_NAME);
        std::fs::create_dir_all(&project).unwrap();
        let nested = temp_dir.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(discover_project_dir_from(&nested), Some(project));
    }

    #[test]
    fn test_global_dir_name() {
        let dir = global_opsboard_dir().unwrap();
        assert!(dir.ends_with(".opsboard"));
    }
}
