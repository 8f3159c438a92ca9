//! Command implementations for the Todosnap CLI.

use crate::api::TodoistClient;
use crate::models::{SnapshotCounts, SnapshotFilters};
use crate::snapshot::{parse_due_window, run_snapshot};
use crate::storage::default_data_dir;
use crate::Result;
use serde::Serialize;
use std::path::PathBuf;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Options for the `snapshot` command, straight from the CLI surface.
#[derive(Debug, Clone, Default)]
pub struct SnapshotOptions {
    pub data_dir: Option<PathBuf>,
    pub no_redact: bool,
    pub diff: Option<PathBuf>,
    pub include_project: Vec<String>,
    pub exclude_project: Vec<String>,
    pub include_label: Vec<String>,
    pub exclude_label: Vec<String>,
    pub due_window: Option<String>,
}

/// Result of the `snapshot` command.
#[derive(Debug, Serialize)]
pub struct SnapshotOutput {
    pub snapshot_path: PathBuf,
    pub counts: SnapshotCounts,
    pub warnings: Vec<String>,
}

impl Output for SnapshotOutput {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Snapshot saved to: {}", self.snapshot_path.display()),
            format!(
                "Counts - Tasks: {}, Projects: {}, Labels: {}",
                self.counts.tasks, self.counts.projects, self.counts.labels
            ),
        ];
        if !self.warnings.is_empty() {
            lines.push("Warnings:".to_string());
            for warning in &self.warnings {
                lines.push(format!("- {warning}"));
            }
        }
        lines.join("\n")
    }
}

/// Create one snapshot, optionally diffing against a prior one.
pub fn snapshot(token: &str, options: SnapshotOptions) -> Result<SnapshotOutput> {
    let due_window_days = parse_due_window(options.due_window.as_deref())?;
    let filters = SnapshotFilters {
        include_projects: options.include_project,
        exclude_projects: options.exclude_project,
        include_labels: options.include_label,
        exclude_labels: options.exclude_label,
        due_window_days,
    };

    let base_dir = options.data_dir.unwrap_or_else(default_data_dir);
    let client = TodoistClient::new(token);
    let result = run_snapshot(
        &client,
        &base_dir,
        !options.no_redact,
        &filters,
        options.diff.as_deref(),
    )?;

    Ok(SnapshotOutput {
        snapshot_path: result.snapshot_path,
        counts: result.counts,
        warnings: result.warnings,
    })
}
