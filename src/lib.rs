//! Opsboard - record filtering and dashboard aggregates
//!
//! This crate provides the core functionality for the `opsboard` CLI tool.
//!
//! # Architecture
//!
//! - [`model`] - Record types (Task, Experiment, Role, Permission) and the `Record` accessor trait
//! - [`filter`] - Predicates, the filter specification and the filter engine
//! - [`aggregate`] - Single-pass dashboard summaries
//! - [`store`] - JSONL record files
//! - [`centralreach`] - CentralReach REST client
//! - [`config`] - Configuration management
//! - [`cli`] - Command-line interface using clap
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregate;
pub mod centralreach;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod store;
pub mod validate;

pub use error::{Error, Result};

use std::sync::atomic::{AtomicBool, Ordering};

/// Set by `--silent`: mutate commands print only the affected ID.
pub static SILENT: AtomicBool = AtomicBool::new(false);

/// Set by `--dry-run`: mutate commands describe the change and write nothing.
pub static DRY_RUN: AtomicBool = AtomicBool::new(false);

/// Set by `--format csv`.
pub static CSV_OUTPUT: AtomicBool = AtomicBool::new(false);

#[inline]
pub fn is_silent() -> bool {
    SILENT.load(Ordering::Relaxed)
}

#[inline]
pub fn is_dry_run() -> bool {
    DRY_RUN.load(Ordering::Relaxed)
}

#[inline]
pub fn is_csv() -> bool {
    CSV_OUTPUT.load(Ordering::Relaxed)
}

/// Quote a CSV field when it contains a comma, quote or newline.
#[must_use]
pub fn csv_escape(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
