//! On-disk record collections.
//!
//! A data directory holds one JSONL file per collection:
//!
//! ```text
//! <data-dir>/
//! ├── .gitignore
//! ├── tasks.jsonl
//! ├── experiments.jsonl
//! ├── roles.jsonl
//! └── permissions.jsonl
//! ```
//!
//! Collections are loaded whole and written back whole; the filter engine
//! and the aggregator only ever see in-memory slices.

pub mod file;

pub use file::{atomic_write, ensure_gitignore, gitignore_content, read_jsonl, write_jsonl};

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::model::{Experiment, Permission, Record, Role, Task};

pub const TASKS_FILE: &str = "tasks.jsonl";
pub const EXPERIMENTS_FILE: &str = "experiments.jsonl";
pub const ROLES_FILE: &str = "roles.jsonl";
pub const PERMISSIONS_FILE: &str = "permissions.jsonl";

/// Every file `opsboard init` creates.
pub const DATA_FILES: [&str; 4] = [TASKS_FILE, EXPERIMENTS_FILE, ROLES_FILE, PERMISSIONS_FILE];

/// All collections in one data directory.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub dir: PathBuf,
    pub tasks: Vec<Task>,
    pub experiments: Vec<Experiment>,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

impl Dataset {
    /// Load every collection from `dir`.
    ///
    /// # Errors
    ///
    /// - [`Error::NotInitialized`] if `dir` does not exist
    /// - [`Error::InvalidRecord`] if any line fails to parse
    /// - [`Error::DuplicateId`] if two records in one file share an id
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::NotInitialized {
                path: dir.to_path_buf(),
            });
        }

        let tasks = load_records::<Task>(&dir.join(TASKS_FILE))?;
        let experiments = load_records::<Experiment>(&dir.join(EXPERIMENTS_FILE))?;
        let roles = load_records::<Role>(&dir.join(ROLES_FILE))?;

        let permissions_path = dir.join(PERMISSIONS_FILE);
        let permissions: Vec<Permission> = read_jsonl(&permissions_path)?;
        check_unique("permission", permissions.iter().map(|p| p.id.as_str()), &permissions_path)?;

        tracing::debug!(
            dir = %dir.display(),
            tasks = tasks.len(),
            experiments = experiments.len(),
            roles = roles.len(),
            permissions = permissions.len(),
            "loaded dataset"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            tasks,
            experiments,
            roles,
            permissions,
        })
    }

    /// Write the task collection back to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_tasks(&self) -> Result<()> {
        write_jsonl(&self.dir.join(TASKS_FILE), &self.tasks)
    }

    /// Write the experiment collection back to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_experiments(&self) -> Result<()> {
        write_jsonl(&self.dir.join(EXPERIMENTS_FILE), &self.experiments)
    }

    /// Write the role collection back to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_roles(&self) -> Result<()> {
        write_jsonl(&self.dir.join(ROLES_FILE), &self.roles)
    }
}

/// Look a record up by id, suggesting near matches when it is missing.
///
/// # Errors
///
/// Returns [`Error::RecordNotFound`] or [`Error::RecordNotFoundSimilar`].
pub fn find_index<R: Record>(records: &[R], id: &str) -> Result<usize> {
    if let Some(index) = records.iter().position(|r| r.id() == id) {
        return Ok(index);
    }

    let kind = R::KIND.as_str();
    let similar = crate::validate::find_similar_ids(id, records.iter().map(Record::id), 3);
    if similar.is_empty() {
        Err(Error::RecordNotFound {
            kind,
            id: id.to_string(),
        })
    } else {
        Err(Error::RecordNotFoundSimilar {
            kind,
            id: id.to_string(),
            similar,
        })
    }
}

fn load_records<R: Record + DeserializeOwned>(path: &Path) -> Result<Vec<R>> {
    let records: Vec<R> = read_jsonl(path)?;
    check_unique(R::KIND.as_str(), records.iter().map(Record::id), path)?;
    Ok(records)
}

fn check_unique<'a>(kind: &'static str, ids: impl Iterator<Item = &'a str>, path: &Path) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(Error::DuplicateId {
                kind,
                id: id.to_string(),
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_dir_is_not_initialized() {
        let temp_dir = TempDir::new().unwrap();
        let err = Dataset::load(&temp_dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, Error::NotInitialized { .. }));
    }

    #[test]
    fn test_load_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        let data = Dataset::load(temp_dir.path()).unwrap();
        assert!(data.tasks.is_empty());
        assert!(data.permissions.is_empty());
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(TASKS_FILE),
            "{\"id\":\"t1\",\"title\":\"a\"}\n{\"id\":\"t1\",\"title\":\"b\"}\n",
        )
        .unwrap();

        let err = Dataset::load(temp_dir.path()).unwrap_err();
        match err {
            Error::DuplicateId { kind, id, .. } => {
                assert_eq!(kind, "task");
                assert_eq!(id, "t1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_save_and_reload_tasks() {
        let temp_dir = TempDir::new().unwrap();
        let mut data = Dataset::load(temp_dir.path()).unwrap();
        data.tasks.push(Task::new("Write report").with_id("t1"));
        data.tasks[0].set_status(TaskStatus::Completed, chrono::Utc::now());
        data.save_tasks().unwrap();

        let reloaded = Dataset::load(temp_dir.path()).unwrap();
        assert_eq!(reloaded.tasks.len(), 1);
        assert_eq!(reloaded.tasks[0].status, TaskStatus::Completed);
        assert_eq!(reloaded.tasks[0].progress, 100);
    }

    #[test]
    fn test_find_index_suggests_similar() {
        let tasks = vec![Task::new("a").with_id("task_abc"), Task::new("b").with_id("exp_987654")];
        assert_eq!(find_index(&tasks, "exp_987654").unwrap(), 1);

        match find_index(&tasks, "task_abd").unwrap_err() {
            Error::RecordNotFoundSimilar { similar, .. } => assert_eq!(similar, vec!["task_abc"]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
