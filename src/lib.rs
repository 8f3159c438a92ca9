//! Todosnap - snapshot, summarize, and diff Todoist task data.
//!
//! This library provides the core functionality for the `tsnap` CLI tool:
//! fetching tasks/projects/labels from the Todoist REST API, normalizing and
//! filtering them, optionally redacting sensitive text, writing a timestamped
//! snapshot directory, and diffing two snapshots.

pub mod api;
pub mod cli;
pub mod commands;
pub mod diff;
pub mod due;
pub mod heuristics;
pub mod models;
pub mod redact;
pub mod report;
pub mod snapshot;
pub mod storage;

use crate::api::ApiError;

/// Library-level error type for Todosnap operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("TODOIST_API_TOKEN is invalid or unauthorized")]
    Unauthorized,

    #[error("Todoist API error: {code} {body}")]
    Api { code: u16, body: String },

    #[error("Network error while connecting to Todoist: {0}")]
    Network(String),

    #[error("{0}")]
    Other(String),
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => Error::Unauthorized,
            ApiError::Status { code, body } => Error::Api { code, body },
            ApiError::Network(msg) => Error::Network(msg),
            ApiError::Parse(msg) => Error::Other(format!("Failed to parse API response: {msg}")),
        }
    }
}

/// Result type alias for Todosnap operations.
pub type Result<T> = std::result::Result<T, Error>;
