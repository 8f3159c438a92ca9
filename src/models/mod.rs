//! Data models for Todosnap.
//!
//! This module defines the canonical shapes written into a snapshot:
//! - `Task` - a normalized Todoist task
//! - `DueInfo` - the structured due block carried by a task
//! - `Project` / `Label` - lookup entities
//! - `SnapshotMeta` - metadata record written alongside the data files
//! - `LocalNote` - empty per-task annotation placeholder
//!
//! These are plain value types with structural equality; all behavior lives
//! in the pipeline modules.

use serde::{Deserialize, Serialize};

/// Sentinel project name for tasks whose project was deleted or never set.
pub const NO_PROJECT: &str = "(No Project)";

/// Structured due information attached to a task.
///
/// At most one of `date` / `datetime` is meaningful; when both are absent the
/// whole block is treated as "no due date" by every consumer. All four
/// sub-fields are copied verbatim from the API and never reformatted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueInfo {
    /// Plain date, ISO 8601 (e.g. "2024-01-15")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Full datetime, ISO 8601 (e.g. "2024-01-15T10:00:00Z")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,

    /// IANA timezone name, if the due datetime is zoned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// Human-readable due string as entered by the user (e.g. "every friday")
    #[serde(rename = "string", skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// A normalized Todoist task as persisted in `tasks.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable identifier, unique within a snapshot
    pub id: String,

    /// Task text (may be empty)
    #[serde(default)]
    pub content: String,

    /// Longer free-form description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Owning project id; None if the task has no project
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Resolved project name; None if the project was deleted or unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    /// Label names attached to the task
    #[serde(default)]
    pub labels: Vec<String>,

    /// Priority on the raw API scale (1-4, higher is more urgent); no
    /// semantic reinterpretation is applied
    #[serde(rename = "priority_api")]
    pub priority: i64,

    /// Structured due information, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<DueInfo>,

    /// Creation timestamp string, opaque
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Web URL of the task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A Todoist project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

/// A Todoist label. `id` is absent when the label was inferred from tasks
/// rather than fetched from the labels endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

/// Filter configuration applied while building a snapshot.
///
/// Matching is case-insensitive; project filters accept either a display
/// name or a raw id. Empty lists are no-ops.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotFilters {
    #[serde(default)]
    pub include_projects: Vec<String>,
    #[serde(default)]
    pub exclude_projects: Vec<String>,
    #[serde(default)]
    pub include_labels: Vec<String>,
    #[serde(default)]
    pub exclude_labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_window_days: Option<i64>,
}

/// Entity counts recomputed from the final task/project/label lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotCounts {
    pub tasks: usize,
    pub projects: usize,
    pub labels: usize,
}

/// Metadata record written to `meta.json`. A snapshot is immutable once
/// written; the timestamp doubles as its directory key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub timestamp: String,
    pub tool_version: String,
    pub filters: SnapshotFilters,
    pub redacted: bool,
    pub counts: SnapshotCounts,
    /// Human-readable descriptions of degraded data (e.g. labels endpoint
    /// unavailable); additive metadata, never a substitute for required data
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Empty per-task annotation placeholder written to `local_notes.json`,
/// intended for out-of-band editing. The pipeline never reads it back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalNote {
    pub notes: String,
    pub assumptions: String,
    pub tags: Vec<String>,
    pub last_updated: String,
}
