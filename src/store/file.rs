//! Atomic JSONL file operations.
//!
//! - Atomic writes: write to a temp file, sync to disk, then rename
//! - Line-numbered parse errors on read

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// Write content to a file atomically.
///
/// The content goes to `<path>.tmp` first, is fsynced, then renamed over
/// `path`. If any step fails, the original file (if any) remains untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("jsonl.tmp");

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Write records to a JSONL file atomically, one JSON object per line.
///
/// # Errors
///
/// Returns an error if a record cannot be serialized or the file cannot be written.
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut content = String::new();
    for record in records {
        content.push_str(&serde_json::to_string(record)?);
        content.push('\n');
    }
    atomic_write(path, &content)
}

/// Read all records from a JSONL file.
///
/// Blank lines are skipped. A missing file reads as an empty collection.
///
/// # Errors
///
/// Returns [`Error::InvalidRecord`] with the 1-based line number if any
/// line fails to parse.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no file, treating as empty");
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        let record = serde_json::from_str(&line).map_err(|e| Error::InvalidRecord {
            path: path.to_path_buf(),
            line: line_num + 1,
            message: e.to_string(),
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Generate .gitignore content for a data directory.
///
/// Ignores everything except the JSONL record files and itself, so temp
/// files never get committed.
#[must_use]
pub fn gitignore_content() -> &'static str {
    r"# Opsboard data directory
# Only the JSONL record files are tracked

*
!.gitignore
!*.jsonl
"
}

/// Ensure a .gitignore exists in the data directory.
///
/// An existing file is left as is.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn ensure_gitignore(dir: &Path) -> Result<()> {
    let gitignore_path = dir.join(".gitignore");
    if gitignore_path.exists() {
        return Ok(());
    }

    fs::create_dir_all(dir)?;
    fs::write(&gitignore_path, gitignore_content())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Permission, Task};
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.jsonl");

        atomic_write(&path, "first\n").unwrap();
        atomic_write(&path, "second\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second\n");
        assert!(!path.with_extension("jsonl.tmp").exists());
    }

    #[test]
    fn test_write_and_read_jsonl() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.jsonl");

        let tasks = vec![Task::new("one").with_id("t1"), Task::new("two").with_id("t2")];
        write_jsonl(&path, &tasks).unwrap();

        let loaded: Vec<Task> = read_jsonl(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, "t1");
        assert_eq!(loaded[1].title, "two");
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let loaded: Vec<Permission> = read_jsonl(&temp_dir.path().join("nope.jsonl")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_read_reports_line_number() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("permissions.jsonl");
        fs::write(
            &path,
            "{\"id\":\"p1\",\"resource\":\"users\"}\n\n{\"id\": 5}\n",
        )
        .unwrap();

        let err = read_jsonl::<Permission>(&path).unwrap_err();
        match err {
            Error::InvalidRecord { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ensure_gitignore_keeps_existing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".gitignore");

        ensure_gitignore(temp_dir.path()).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("!*.jsonl"));

        fs::write(&path, "custom\n").unwrap();
        ensure_gitignore(temp_dir.path()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "custom\n");
    }
}
