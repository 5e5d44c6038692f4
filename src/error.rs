//! Error types for Opsboard.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=data dir, 3=not_found, 4=validation, etc.)
//! - Retryability flags
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers
//!
//! The filtering core never produces these: predicates, the engine and the
//! aggregator are total. Errors come from loading files, parsing user input
//! and the CentralReach client.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Opsboard operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Data directory (exit 2)
    NotInitialized,
    AlreadyInitialized,

    // Not Found (exit 3)
    RecordNotFound,

    // Validation (exit 4)
    InvalidStatus,
    InvalidPriority,
    InvalidCategory,
    InvalidDate,
    InvalidArgument,
    DuplicateId,

    // Store (exit 6)
    StoreError,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Transport (exit 9)
    TransportError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::RecordNotFound => "RECORD_NOT_FOUND",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::InvalidPriority => "INVALID_PRIORITY",
            Self::InvalidCategory => "INVALID_CATEGORY",
            Self::InvalidDate => "INVALID_DATE",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::DuplicateId => "DUPLICATE_ID",
            Self::StoreError => "STORE_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::TransportError => "TRANSPORT_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-9).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::NotInitialized | Self::AlreadyInitialized => 2,
            Self::RecordNotFound => 3,
            Self::InvalidStatus
            | Self::InvalidPriority
            | Self::InvalidCategory
            | Self::InvalidDate
            | Self::InvalidArgument
            | Self::DuplicateId => 4,
            Self::StoreError => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
            Self::TransportError => 9,
        }
    }

    /// Whether retrying with corrected input can succeed.
    ///
    /// True for validation errors. Transport errors are not retryable here:
    /// the client performs no retry and callers should not assume one helps.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidStatus
                | Self::InvalidPriority
                | Self::InvalidCategory
                | Self::InvalidDate
                | Self::InvalidArgument
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in Opsboard operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: no data directory at {path}")]
    NotInitialized { path: PathBuf },

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("{kind} not found: {id}")]
    RecordNotFound { kind: &'static str, id: String },

    #[error("{kind} not found: {id} (did you mean: {}?)", similar.join(", "))]
    RecordNotFoundSimilar {
        kind: &'static str,
        id: String,
        similar: Vec<String>,
    },

    #[error("Duplicate {kind} id '{id}' in {path}")]
    DuplicateId {
        kind: &'static str,
        id: String,
        path: PathBuf,
    },

    #[error("Invalid {kind} status: {value}")]
    InvalidStatus {
        kind: &'static str,
        value: String,
        suggestion: Option<String>,
    },

    #[error("Invalid priority: {value}")]
    InvalidPriority {
        value: String,
        suggestion: Option<String>,
    },

    #[error("Invalid {kind} category: {value}")]
    InvalidCategory {
        kind: &'static str,
        value: String,
        suggestion: Option<String>,
    },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid record at {path}:{line}: {message}")]
    InvalidRecord {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("CentralReach request failed ({status}): {message}")]
    Transport { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized { .. } => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::RecordNotFound { .. } | Self::RecordNotFoundSimilar { .. } => {
                ErrorCode::RecordNotFound
            }
            Self::DuplicateId { .. } => ErrorCode::DuplicateId,
            Self::InvalidStatus { .. } => ErrorCode::InvalidStatus,
            Self::InvalidPriority { .. } => ErrorCode::InvalidPriority,
            Self::InvalidCategory { .. } => ErrorCode::InvalidCategory,
            Self::InvalidDate(_) => ErrorCode::InvalidDate,
            Self::InvalidRecord { .. } => ErrorCode::StoreError,
            Self::Transport { .. } | Self::Http(_) => ErrorCode::TransportError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized { .. } => {
                Some("Run `opsboard init` to create the data directory".to_string())
            }

            Self::AlreadyInitialized { path } => Some(format!(
                "Data directory already exists at {}. Use `--force` to reset it.",
                path.display()
            )),

            Self::RecordNotFound { kind, id } => Some(format!(
                "No {kind} with ID '{id}'. Use `opsboard {kind} list` to see available records."
            )),
            Self::RecordNotFoundSimilar { similar, .. } => {
                Some(format!("Did you mean: {}?", similar.join(", ")))
            }

            Self::DuplicateId { path, .. } => Some(format!(
                "IDs must be unique within a file. Edit {} and rename one of the records.",
                path.display()
            )),

            Self::InvalidStatus { kind, suggestion, .. } => {
                let valid = match *kind {
                    "experiment" => "planned, running, analyzing, completed, abandoned",
                    "role" => "active, inactive",
                    _ => "todo, in_progress, review, completed, cancelled",
                };
                Some(match suggestion {
                    Some(s) => format!("Did you mean '{s}'? Valid statuses: {valid}"),
                    None => format!("Valid statuses: {valid}. Synonyms: done→completed, wip→in_progress"),
                })
            }

            Self::InvalidPriority { suggestion, .. } => Some(match suggestion {
                Some(s) => format!("Did you mean '{s}'? Valid priorities: low, medium, high, urgent"),
                None => "Valid priorities: low, medium, high, urgent (or P0-P3)".to_string(),
            }),

            Self::InvalidCategory { kind, suggestion, .. } => {
                let valid = if *kind == "experiment" {
                    "product, process, software, materials, prototype"
                } else {
                    "development, design, marketing, operations, research, support, administrative"
                };
                Some(match suggestion {
                    Some(s) => format!("Did you mean '{s}'? Valid categories: {valid}"),
                    None => format!("Valid categories: {valid}"),
                })
            }

            Self::InvalidDate(_) => Some(
                "Use YYYY-MM-DD, today, yesterday, tomorrow, or a relative offset like -7d".to_string(),
            ),

            Self::InvalidRecord { path, line, .. } => Some(format!(
                "Fix or remove line {line} of {}; each line must be one JSON object.",
                path.display()
            )),

            Self::Transport { status, .. } if *status == 401 || *status == 403 => Some(
                "Check CENTRALREACH_TOKEN or `centralreach.token` in ~/.opsboard/config.json".to_string(),
            ),

            Self::Transport { .. }
            | Self::Http(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Self::Transport { status, .. } = self {
            obj["error"]["status"] = serde_json::Value::from(*status);
        }

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::NotInitialized { path: PathBuf::from("/x") }.exit_code(), 2);
        assert_eq!(
            Error::RecordNotFound { kind: "task", id: "t1".into() }.exit_code(),
            3
        );
        assert_eq!(Error::InvalidDate("soon".into()).exit_code(), 4);
        assert_eq!(
            Error::Transport { status: 500, message: "boom".into() }.exit_code(),
            9
        );
    }

    #[test]
    fn test_status_hint_uses_suggestion() {
        let err = Error::InvalidStatus {
            kind: "task",
            value: "revew".into(),
            suggestion: Some("review".into()),
        };
        let hint = err.hint().unwrap();
        assert!(hint.contains("'review'"));
        assert!(err.error_code().is_retryable());
    }

    #[test]
    fn test_structured_json_includes_transport_status() {
        let err = Error::Transport { status: 401, message: "Unauthorized".into() };
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "TRANSPORT_ERROR");
        assert_eq!(json["error"]["status"], 401);
        assert_eq!(json["error"]["retryable"], false);
        assert!(json["error"]["hint"].as_str().unwrap().contains("CENTRALREACH_TOKEN"));
    }

    #[test]
    fn test_similar_ids_in_message() {
        let err = Error::RecordNotFoundSimilar {
            kind: "task",
            id: "task_12".into(),
            similar: vec!["task_11".into(), "task_13".into()],
        };
        assert_eq!(err.to_string(), "task not found: task_12 (did you mean: task_11, task_13?)");
    }
}
