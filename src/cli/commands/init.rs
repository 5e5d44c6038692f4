//! Initialize an Opsboard data directory.
//!
//! Creates the directory with one empty JSONL file per collection and a
//! `.gitignore` that tracks only those files. Without `--data-dir` the
//! directory is `./.opsboard`, which later commands find by walking up.

use crate::config::PROJECT_DIR_NAME;
use crate::error::{Error, Result};
use crate::store::{atomic_write, ensure_gitignore, DATA_FILES};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct InitOutput {
    path: PathBuf,
    files: Vec<&'static str>,
    reset: bool,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns [`Error::AlreadyInitialized`] if record files exist and `force`
/// is not set, or an I/O error if the directory cannot be written.
pub fn execute(data_dir: Option<&Path>, force: bool, json: bool) -> Result<()> {
    let dir = data_dir.map_or_else(|| Path::new(".").join(PROJECT_DIR_NAME), Path::to_path_buf);

    let existing = DATA_FILES.iter().any(|f| dir.join(f).exists());
    if existing && !force {
        return Err(Error::AlreadyInitialized { path: dir });
    }

    if crate::is_dry_run() {
        println!("Would initialize data directory at {}", dir.display());
        return Ok(());
    }

    fs::create_dir_all(&dir)?;
    ensure_gitignore(&dir)?;
    for file in DATA_FILES {
        let path = dir.join(file);
        if force || !path.exists() {
            atomic_write(&path, "")?;
        }
    }
    tracing::debug!(dir = %dir.display(), force, "initialized data directory");

    if crate::is_silent() {
        println!("{}", dir.display());
    } else if json {
        let output = InitOutput {
            path: dir,
            files: DATA_FILES.to_vec(),
            reset: existing,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Initialized Opsboard data directory at {}", dir.display());
        for file in DATA_FILES {
            println!("  {file}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("data");

        execute(Some(&dir), false, true).unwrap();

        for file in DATA_FILES {
            assert!(dir.join(file).exists(), "{file} missing");
        }
        assert!(dir.join(".gitignore").exists());
    }

    #[test]
    fn test_init_twice_requires_force() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_path_buf();

        execute(Some(&dir), false, true).unwrap();
        fs::write(dir.join("tasks.jsonl"), "{\"id\":\"t1\",\"title\":\"a\"}\n").unwrap();

        let err = execute(Some(&dir), false, true).unwrap_err();
        assert!(matches!(err, Error::AlreadyInitialized { .. }));

        execute(Some(&dir), true, true).unwrap();
        assert_eq!(fs::read_to_string(dir.join("tasks.jsonl")).unwrap(), "");
    }
}
