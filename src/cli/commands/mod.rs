//! Command implementations.

pub mod completions;
pub mod cr;
pub mod experiment;
pub mod filter;
pub mod init;
pub mod records;
pub mod role;
pub mod task;
pub mod version;

use crate::config::resolve_data_dir;
use crate::error::{Error, Result};
use crate::store::Dataset;
use std::path::Path;

/// Load every collection from the resolved data directory.
pub(crate) fn load_dataset(data_dir: Option<&Path>) -> Result<Dataset> {
    let dir = resolve_data_dir(data_dir)
        .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))?;
    Dataset::load(&dir)
}
