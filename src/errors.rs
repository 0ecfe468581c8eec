//! # Error Types
//!
//! Error handling for the widget MCP service.
//! Engines return these internally; the facade turns them into structured
//! `{success: false, error}` results and only argument decoding failures in the
//! tool layer ever reach the transport as MCP `ErrorData`.

use rmcp::model::ErrorData;
use std::fmt;

/// Error types that can occur while viewing, searching or mutating widget files.
#[derive(Debug)]
pub enum ServiceError {
    /// A required endpoint or credential was not configured
    ConfigurationMissing(String),
    /// The referenced file does not exist in the widget
    NotFound(String),
    /// Requested line range is outside the file or inverted
    InvalidRange {
        first: usize,
        last: usize,
        total: usize,
    },
    /// The caller's search snippet no longer matches the targeted lines
    PatternMismatch { first: usize, last: usize },
    /// Storage, index or embedding call failed or timed out
    RemoteOperationFailure(String),
    /// File path is empty, escapes the widget root or is otherwise malformed
    InvalidPath(String),
    /// Search query cannot be used
    InvalidQuery(String),
    /// Internal service error with custom message
    Internal(String),
    /// I/O error reading/writing local files
    Io(std::io::Error),
    /// Error parsing JSON data
    SerdeJson(serde_json::Error),
    /// Error parsing YAML configuration
    SerdeYaml(serde_yaml::Error),
    /// Regular expression compilation error
    Regex(regex::Error),
    /// Glob pattern compilation error
    Glob(globset::Error),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::ConfigurationMissing(what) => {
                write!(f, "Configuration missing: {what}")
            }
            ServiceError::NotFound(path) => write!(f, "File not found: {path}"),
            ServiceError::InvalidRange { first, last, total } => write!(
                f,
                "Invalid line range {first}-{last}: file has {total} lines (expected 1 <= first <= last <= {total})"
            ),
            ServiceError::PatternMismatch { first, last } => write!(
                f,
                "Search text does not match lines {first}-{last}; view the file again and retry with current content"
            ),
            ServiceError::RemoteOperationFailure(msg) => {
                write!(f, "Remote operation failed: {msg}")
            }
            ServiceError::InvalidPath(msg) => write!(f, "Invalid path: {msg}"),
            ServiceError::InvalidQuery(msg) => write!(f, "Invalid query: {msg}"),
            ServiceError::Internal(msg) => write!(f, "Internal error: {msg}"),
            ServiceError::Io(err) => write!(f, "IO error: {err}"),
            ServiceError::SerdeJson(err) => write!(f, "JSON parsing error: {err}"),
            ServiceError::SerdeYaml(err) => write!(f, "YAML parsing error: {err}"),
            ServiceError::Regex(err) => write!(f, "Regex error: {err}"),
            ServiceError::Glob(err) => write!(f, "Glob error: {err}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::Io(err)
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerdeJson(err)
    }
}

impl From<serde_yaml::Error> for ServiceError {
    fn from(err: serde_yaml::Error) -> Self {
        ServiceError::SerdeYaml(err)
    }
}

impl From<regex::Error> for ServiceError {
    fn from(err: regex::Error) -> Self {
        ServiceError::Regex(err)
    }
}

impl From<globset::Error> for ServiceError {
    fn from(err: globset::Error) -> Self {
        ServiceError::Glob(err)
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::RemoteOperationFailure(format!("request timed out: {err}"))
        } else {
            ServiceError::RemoteOperationFailure(err.to_string())
        }
    }
}

impl From<ServiceError> for ErrorData {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidPath(_)
            | ServiceError::InvalidQuery(_)
            | ServiceError::InvalidRange { .. } => ErrorData::invalid_params(err.to_string(), None),
            _ => ErrorData::internal_error(err.to_string(), None),
        }
    }
}
