//! Snapshot pipeline: normalize raw API records, filter, redact, and write
//! a timestamped snapshot directory with its derived reports.
//!
//! A snapshot is created once and never mutated. Tasks and projects must be
//! fetched successfully or the whole run fails; a failing labels endpoint
//! degrades to labels inferred from tasks plus a warning in the metadata.

use crate::api::TaskSource;
use crate::diff::{build_diff_md, diff_snapshots};
use crate::due::parse_due;
use crate::models::{
    DueInfo, Label, LocalNote, Project, SnapshotCounts, SnapshotFilters, SnapshotMeta, Task,
};
use crate::redact::redact_text;
use crate::report::{build_projects_md, build_summary_md, build_tasks_top_md};
use crate::storage::{ensure_dir, snapshot_dir, write_json};
use crate::{Error, Result};
use chrono::{Duration, Local, NaiveDate};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of a snapshot run.
#[derive(Debug, Clone)]
pub struct SnapshotResult {
    pub snapshot_path: PathBuf,
    pub counts: SnapshotCounts,
    pub warnings: Vec<String>,
}

/// Coerce a raw identifier to a string. Upstream ids may arrive as JSON
/// numbers or strings.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn opt_string(raw: &Value, field: &str) -> Option<String> {
    raw.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Map a raw task record to the canonical shape.
///
/// Optional fields fail closed to defaults (`content` to empty, `labels` to
/// none, `priority` to 1); only an unusable `id` is an error. The due block
/// is constructed only when the raw `due` object is non-empty, its four
/// sub-fields copied verbatim.
pub fn normalize_task(raw: &Value, project_lookup: &HashMap<String, String>) -> Result<Task> {
    let id = raw
        .get("id")
        .and_then(id_string)
        .ok_or_else(|| Error::InvalidInput(format!("task record missing id: {raw}")))?;

    let due = raw
        .get("due")
        .and_then(Value::as_object)
        .filter(|obj| !obj.is_empty())
        .map(|obj| DueInfo {
            date: obj.get("date").and_then(Value::as_str).map(str::to_string),
            datetime: obj
                .get("datetime")
                .and_then(Value::as_str)
                .map(str::to_string),
            timezone: obj
                .get("timezone")
                .and_then(Value::as_str)
                .map(str::to_string),
            display: obj
                .get("string")
                .and_then(Value::as_str)
                .map(str::to_string),
        });

    let project_id = raw.get("project_id").and_then(id_string);
    let project_name = project_id
        .as_ref()
        .and_then(|pid| project_lookup.get(pid).cloned());

    Ok(Task {
        id,
        content: opt_string(raw, "content").unwrap_or_default(),
        description: opt_string(raw, "description"),
        project_id,
        project_name,
        labels: raw
            .get("labels")
            .and_then(Value::as_array)
            .map(|labels| {
                labels
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        priority: raw.get("priority").and_then(Value::as_i64).unwrap_or(1),
        due,
        created_at: opt_string(raw, "created_at"),
        url: opt_string(raw, "url"),
    })
}

fn normalize_project(raw: &Value) -> Result<Project> {
    let id = raw
        .get("id")
        .and_then(id_string)
        .ok_or_else(|| Error::InvalidInput(format!("project record missing id: {raw}")))?;
    let name = opt_string(raw, "name")
        .ok_or_else(|| Error::InvalidInput(format!("project record missing name: {raw}")))?;
    Ok(Project { id, name })
}

fn normalize_label(raw: &Value) -> Result<Label> {
    let name = opt_string(raw, "name")
        .ok_or_else(|| Error::InvalidInput(format!("label record missing name: {raw}")))?;
    Ok(Label {
        id: raw.get("id").and_then(id_string),
        name,
    })
}

fn apply_redaction(task: &mut Task) {
    task.content = redact_text(&task.content, true);
    if let Some(description) = &task.description {
        task.description = Some(redact_text(description, true));
    }
}

/// True when the task's project matches any of the given names or ids,
/// case-insensitively. An empty filter list matches everything.
fn matches_project(task: &Task, names_or_ids: &[String]) -> bool {
    if names_or_ids.is_empty() {
        return true;
    }
    let wanted: BTreeSet<String> = names_or_ids.iter().map(|s| s.to_lowercase()).collect();
    let id_match = task
        .project_id
        .as_ref()
        .is_some_and(|id| wanted.contains(&id.to_lowercase()));
    let name_match = task
        .project_name
        .as_ref()
        .is_some_and(|name| wanted.contains(&name.to_lowercase()));
    id_match || name_match
}

/// True when any of the task's labels is in the given list,
/// case-insensitively. An empty filter list matches everything.
fn matches_labels(task: &Task, labels: &[String]) -> bool {
    if labels.is_empty() {
        return true;
    }
    let wanted: BTreeSet<String> = labels.iter().map(|s| s.to_lowercase()).collect();
    task.labels
        .iter()
        .any(|label| wanted.contains(&label.to_lowercase()))
}

/// Parse a due window of the form "Nd" (e.g. "14d") into a day count.
pub fn parse_due_window(value: Option<&str>) -> Result<Option<i64>> {
    let Some(value) = value else {
        return Ok(None);
    };
    value
        .strip_suffix('d')
        .and_then(|digits| digits.parse::<i64>().ok())
        .map(Some)
        .ok_or_else(|| {
            Error::InvalidInput("Due window must be in the form Nd, e.g. 14d".to_string())
        })
}

/// True when the task has a parseable due date on or before `today + days`.
fn within_due_window(task: &Task, days: i64, today: NaiveDate) -> bool {
    parse_due(task).is_some_and(|due| due <= today + Duration::days(days))
}

/// Normalize, filter, and redact raw payloads into the final collections.
///
/// `labels == None` means the labels endpoint was unavailable: the label
/// list is inferred from the union of labels attached to surviving tasks,
/// and a warning is recorded.
pub fn build_snapshot_from_data(
    tasks: &[Value],
    projects: &[Value],
    labels: Option<&[Value]>,
    redacted: bool,
    filters: &SnapshotFilters,
) -> Result<(Vec<Task>, Vec<Project>, Vec<Label>, Vec<String>)> {
    let mut warnings = Vec::new();

    let project_models: Vec<Project> = projects
        .iter()
        .map(normalize_project)
        .collect::<Result<_>>()?;
    let project_lookup: HashMap<String, String> = project_models
        .iter()
        .map(|p| (p.id.clone(), p.name.clone()))
        .collect();

    let mut normalized: Vec<Task> = tasks
        .iter()
        .map(|raw| normalize_task(raw, &project_lookup))
        .collect::<Result<_>>()?;

    // Fixed application order; each predicate narrows the surviving set.
    if !filters.include_projects.is_empty() {
        normalized.retain(|task| matches_project(task, &filters.include_projects));
    }
    if !filters.exclude_projects.is_empty() {
        normalized.retain(|task| !matches_project(task, &filters.exclude_projects));
    }
    if !filters.include_labels.is_empty() {
        normalized.retain(|task| matches_labels(task, &filters.include_labels));
    }
    if !filters.exclude_labels.is_empty() {
        normalized.retain(|task| !matches_labels(task, &filters.exclude_labels));
    }

    if redacted {
        for task in &mut normalized {
            apply_redaction(task);
        }
    }

    let label_models = match labels {
        Some(labels) => labels
            .iter()
            .map(normalize_label)
            .collect::<Result<Vec<Label>>>()?,
        None => {
            let inferred: BTreeSet<&String> =
                normalized.iter().flat_map(|task| &task.labels).collect();
            warnings.push("Labels endpoint unavailable; inferred labels from tasks.".to_string());
            inferred
                .into_iter()
                .map(|name| Label {
                    id: None,
                    name: name.clone(),
                })
                .collect()
        }
    };

    Ok((normalized, project_models, label_models, warnings))
}

/// Fetch, build, and persist one snapshot, optionally diffing against a
/// prior snapshot directory.
pub fn run_snapshot(
    source: &dyn TaskSource,
    base_dir: &Path,
    redacted: bool,
    filters: &SnapshotFilters,
    diff_path: Option<&Path>,
) -> Result<SnapshotResult> {
    let raw_tasks = source.list_tasks()?;
    let raw_projects = source.list_projects()?;

    // Labels are best-effort: a failure degrades to inferred labels.
    let mut label_warning = None;
    let mut label_filename = "labels.json";
    let raw_labels = match source.list_labels() {
        Ok(labels) => Some(labels),
        Err(e) => {
            label_warning = Some(format!("Labels endpoint unavailable: {e}"));
            label_filename = "inferred_labels.json";
            None
        }
    };

    let (tasks, projects, labels, mut warnings) = build_snapshot_from_data(
        &raw_tasks,
        &raw_projects,
        raw_labels.as_deref(),
        redacted,
        filters,
    )?;
    warnings.extend(label_warning);

    let now = Local::now();
    let timestamp = now.format("%Y-%m-%d_%H%M").to_string();
    let today = now.date_naive();

    let result = write_snapshot(
        base_dir,
        &timestamp,
        &tasks,
        &projects,
        &labels,
        redacted,
        filters,
        warnings,
        label_filename,
        today,
    )?;

    if let Some(previous) = diff_path {
        let diff = diff_snapshots(&result.snapshot_path, previous, today)?;
        fs::write(result.snapshot_path.join("DIFF.md"), build_diff_md(&diff))?;
    }

    Ok(result)
}

/// Write the snapshot directory: JSON collections, metadata, the local-notes
/// placeholder, and the Markdown reports. Not transactional - on partial
/// failure the caller retries the whole operation.
#[allow(clippy::too_many_arguments)]
pub fn write_snapshot(
    base_dir: &Path,
    timestamp: &str,
    tasks: &[Task],
    projects: &[Project],
    labels: &[Label],
    redacted: bool,
    filters: &SnapshotFilters,
    warnings: Vec<String>,
    label_filename: &str,
    today: NaiveDate,
) -> Result<SnapshotResult> {
    let snap_dir = snapshot_dir(base_dir, timestamp);
    ensure_dir(&snap_dir)?;

    let counts = SnapshotCounts {
        tasks: tasks.len(),
        projects: projects.len(),
        labels: labels.len(),
    };

    let meta = SnapshotMeta {
        timestamp: timestamp.to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        filters: filters.clone(),
        redacted,
        counts,
        warnings: warnings.clone(),
    };

    write_json(&snap_dir.join("meta.json"), &meta)?;
    write_json(&snap_dir.join("tasks.json"), &tasks)?;
    write_json(&snap_dir.join("projects.json"), &projects)?;
    write_json(&snap_dir.join(label_filename), &labels)?;

    let local_notes: BTreeMap<&str, LocalNote> = tasks
        .iter()
        .map(|task| (task.id.as_str(), LocalNote::default()))
        .collect();
    write_json(&snap_dir.join("local_notes.json"), &local_notes)?;

    fs::write(
        snap_dir.join("SUMMARY.md"),
        build_summary_md(tasks, projects, today),
    )?;
    fs::write(
        snap_dir.join("PROJECTS.md"),
        build_projects_md(tasks, projects, today),
    )?;
    fs::write(snap_dir.join("TASKS_TOP.md"), build_tasks_top_md(tasks, today))?;

    if let Some(days) = filters.due_window_days {
        let window_tasks: Vec<&Task> = tasks
            .iter()
            .filter(|task| within_due_window(task, days, today))
            .collect();
        write_json(&snap_dir.join("tasks_due_window.json"), &window_tasks)?;
    }

    Ok(SnapshotResult {
        snapshot_path: snap_dir,
        counts,
        warnings,
    })
}
