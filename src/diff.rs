//! Snapshot-to-snapshot diffing.
//!
//! Reads the task lists of two persisted snapshots (never writing to
//! either) and reports additions, removals, label changes, due-date changes,
//! and newly-overdue tasks. A known limitation, stated in the rendered
//! report: removals may be tasks completed upstream and absent from an
//! active-only listing, not true deletions.

use crate::due::parse_due;
use crate::models::{DueInfo, NO_PROJECT, Task};
use crate::storage::read_json;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// One task whose label set changed between snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelChange {
    pub id: String,
    pub previous: Vec<String>,
    pub current: Vec<String>,
}

/// One task whose effective due date changed between snapshots,
/// absent-to-present transitions included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueChange {
    pub id: String,
    pub previous: Option<DueInfo>,
    pub current: Option<DueInfo>,
}

/// Result of comparing two snapshots' task sets, keyed by task id.
#[derive(Debug, Clone, Default)]
pub struct SnapshotDiff {
    /// Current per-project task counts, descending by count then name
    pub counts_by_project: Vec<(String, usize)>,
    /// Present in current, absent in previous (sorted by id)
    pub added: Vec<Task>,
    /// Present in previous, absent in current (sorted by id)
    pub removed: Vec<Task>,
    /// Added tasks whose due date is strictly before today
    pub new_overdue: Vec<Task>,
    pub label_changes: Vec<LabelChange>,
    pub due_changes: Vec<DueChange>,
}

fn load_tasks(snapshot_path: &Path) -> crate::Result<Vec<Task>> {
    read_json(&snapshot_path.join("tasks.json"))
}

/// Compare the task sets of two snapshot directories.
pub fn diff_snapshots(
    current_path: &Path,
    previous_path: &Path,
    today: NaiveDate,
) -> crate::Result<SnapshotDiff> {
    let current_tasks = load_tasks(current_path)?;
    let previous_tasks = load_tasks(previous_path)?;
    Ok(diff_tasks(&current_tasks, &previous_tasks, today))
}

/// Core diff over already-loaded task lists.
pub fn diff_tasks(current_tasks: &[Task], previous_tasks: &[Task], today: NaiveDate) -> SnapshotDiff {
    let current_map: BTreeMap<&str, &Task> =
        current_tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    let previous_map: BTreeMap<&str, &Task> =
        previous_tasks.iter().map(|t| (t.id.as_str(), t)).collect();

    let added: Vec<Task> = current_map
        .iter()
        .filter(|(id, _)| !previous_map.contains_key(*id))
        .map(|(_, task)| (*task).clone())
        .collect();
    let removed: Vec<Task> = previous_map
        .iter()
        .filter(|(id, _)| !current_map.contains_key(*id))
        .map(|(_, task)| (*task).clone())
        .collect();

    let mut label_changes = Vec::new();
    let mut due_changes = Vec::new();
    for (id, current) in &current_map {
        let Some(previous) = previous_map.get(id) else {
            continue;
        };

        let current_labels: HashSet<&str> = current.labels.iter().map(String::as_str).collect();
        let previous_labels: HashSet<&str> = previous.labels.iter().map(String::as_str).collect();
        if current_labels != previous_labels {
            label_changes.push(LabelChange {
                id: id.to_string(),
                previous: previous.labels.clone(),
                current: current.labels.clone(),
            });
        }

        if parse_due(current) != parse_due(previous) {
            due_changes.push(DueChange {
                id: id.to_string(),
                previous: previous.due.clone(),
                current: current.due.clone(),
            });
        }
    }

    let new_overdue: Vec<Task> = added
        .iter()
        .filter(|task| parse_due(task).is_some_and(|due| due < today))
        .cloned()
        .collect();

    let mut project_counts: BTreeMap<String, usize> = BTreeMap::new();
    for task in current_tasks {
        let name = task
            .project_name
            .clone()
            .unwrap_or_else(|| NO_PROJECT.to_string());
        *project_counts.entry(name).or_insert(0) += 1;
    }
    let mut counts_by_project: Vec<(String, usize)> = project_counts.into_iter().collect();
    counts_by_project.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    SnapshotDiff {
        counts_by_project,
        added,
        removed,
        new_overdue,
        label_changes,
        due_changes,
    }
}

fn fmt_due(due: &Option<DueInfo>) -> String {
    due.as_ref()
        .and_then(|d| d.datetime.as_deref().or(d.date.as_deref()))
        .unwrap_or("none")
        .to_string()
}

fn push_section(lines: &mut Vec<String>, heading: &str, entries: Vec<String>) {
    lines.push(String::new());
    lines.push(heading.to_string());
    if entries.is_empty() {
        lines.push("- None".to_string());
    } else {
        lines.extend(entries);
    }
}

/// Render the diff as a fixed-section Markdown report.
pub fn build_diff_md(diff: &SnapshotDiff) -> String {
    let mut lines = vec!["# Snapshot Diff".to_string(), String::new()];
    lines.push("## Counts by project".to_string());
    for (project, count) in &diff.counts_by_project {
        lines.push(format!("- {project}: {count}"));
    }

    push_section(
        &mut lines,
        "## Newly added tasks",
        diff.added
            .iter()
            .map(|t| format!("- {}: {}", t.id, t.content))
            .collect(),
    );
    push_section(
        &mut lines,
        "## Removed tasks",
        diff.removed
            .iter()
            .map(|t| format!("- {}: {}", t.id, t.content))
            .collect(),
    );
    push_section(
        &mut lines,
        "## New overdue tasks",
        diff.new_overdue
            .iter()
            .map(|t| format!("- {}: {}", t.id, t.content))
            .collect(),
    );
    push_section(
        &mut lines,
        "## Label changes",
        diff.label_changes
            .iter()
            .map(|c| {
                format!(
                    "- {}: [{}] -> [{}]",
                    c.id,
                    c.previous.join(", "),
                    c.current.join(", ")
                )
            })
            .collect(),
    );
    push_section(
        &mut lines,
        "## Due date changes",
        diff.due_changes
            .iter()
            .map(|c| format!("- {}: {} -> {}", c.id, fmt_due(&c.previous), fmt_due(&c.current)))
            .collect(),
    );

    lines.extend([
        String::new(),
        "## Limitations".to_string(),
        "- Completed tasks are not included in active-only snapshots, so removals may include completed items."
            .to_string(),
    ]);

    lines.join("\n") + "\n"
}
