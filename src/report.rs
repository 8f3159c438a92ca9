//! Markdown report rendering for a snapshot.
//!
//! Three reports are derived from the final task/project lists: an overview
//! summary, a per-project detail report, and a top-urgency table. All count
//! rankings are deterministic (descending count, then name).

use crate::due::{due_buckets, parse_due, planning_debt, urgency_order};
use crate::heuristics::{is_blocked, is_vague};
use crate::models::{NO_PROJECT, Project, Task};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// How many tasks the urgency table shows.
const TOP_TASKS_LIMIT: usize = 100;

/// Count tasks per project name, with `NO_PROJECT` for unassigned tasks.
fn tasks_by_project(tasks: &[Task]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for task in tasks {
        let name = task
            .project_name
            .clone()
            .unwrap_or_else(|| NO_PROJECT.to_string());
        *counts.entry(name).or_insert(0) += 1;
    }
    counts
}

/// Count label occurrences across all tasks.
fn tasks_by_label(tasks: &[Task]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for task in tasks {
        for label in &task.labels {
            *counts.entry(label.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Rank counted names by count descending, name ascending; keep `limit`.
fn top_counts(counts: &BTreeMap<String, usize>, limit: usize) -> Vec<(&str, usize)> {
    let mut ranked: Vec<(&str, usize)> = counts
        .iter()
        .map(|(name, count)| (name.as_str(), *count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(limit);
    ranked
}

fn push_task_lines<'a, I>(lines: &mut Vec<String>, tasks: I)
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut any = false;
    for task in tasks {
        lines.push(format!("- {}: {}", task.id, task.content));
        any = true;
    }
    if !any {
        lines.push("- None".to_string());
    }
}

/// Render the overview summary: counts, per-project and label rankings, due
/// distribution, vague and blocked candidates, and planning-debt projects.
pub fn build_summary_md(tasks: &[Task], projects: &[Project], today: NaiveDate) -> String {
    let project_counts = tasks_by_project(tasks);
    let label_counts = tasks_by_label(tasks);
    let buckets = due_buckets(tasks, today);
    let debt = planning_debt(tasks);

    let mut lines = vec![
        "# Summary".to_string(),
        String::new(),
        "## Overview counts".to_string(),
        format!("- Tasks: {}", tasks.len()),
        format!("- Projects: {}", projects.len()),
        String::new(),
        "## Tasks by project (top 20 by count)".to_string(),
    ];

    let top_projects = top_counts(&project_counts, 20);
    if top_projects.is_empty() {
        lines.push("- None".to_string());
    } else {
        lines.extend(
            top_projects
                .iter()
                .map(|(name, count)| format!("- {name}: {count}")),
        );
    }

    lines.extend([
        String::new(),
        "## Due distribution".to_string(),
        format!("- Overdue: {}", buckets.overdue),
        format!("- Due today: {}", buckets.due_today),
        format!("- Due next 7: {}", buckets.due_next_7),
        format!("- Due next 30: {}", buckets.due_next_30),
        format!("- No due: {}", buckets.no_due),
        String::new(),
        "## Top labels (top 30)".to_string(),
    ]);

    let top_labels = top_counts(&label_counts, 30);
    if top_labels.is_empty() {
        lines.push("- None".to_string());
    } else {
        lines.extend(
            top_labels
                .iter()
                .map(|(name, count)| format!("- {name}: {count}")),
        );
    }

    lines.extend([String::new(), "## Vague tasks".to_string()]);
    push_task_lines(&mut lines, tasks.iter().filter(|t| is_vague(&t.content)));

    lines.extend([String::new(), "## Waiting/Blocked candidates".to_string()]);
    push_task_lines(
        &mut lines,
        tasks.iter().filter(|t| is_blocked(&t.content, &t.labels)),
    );

    lines.extend([
        String::new(),
        "## Projects with many no-due tasks".to_string(),
    ]);
    if debt.is_empty() {
        lines.push("- None".to_string());
    } else {
        lines.extend(
            debt.iter()
                .map(|(name, no_due, total)| format!("- {name}: {no_due}/{total} no-due")),
        );
    }

    lines.join("\n") + "\n"
}

/// Render the per-project detail report. Every fetched project gets a
/// section even with zero tasks; unassigned tasks group under `NO_PROJECT`.
pub fn build_projects_md(tasks: &[Task], projects: &[Project], today: NaiveDate) -> String {
    let mut by_project: BTreeMap<String, Vec<&Task>> = BTreeMap::new();
    for project in projects {
        by_project.entry(project.name.clone()).or_default();
    }
    for task in tasks {
        let name = task
            .project_name
            .clone()
            .unwrap_or_else(|| NO_PROJECT.to_string());
        by_project.entry(name).or_default().push(task);
    }

    let mut lines = vec!["# Projects".to_string()];
    for (name, project_tasks) in &by_project {
        let mut overdue = 0;
        let mut next_due: Option<NaiveDate> = None;
        let mut label_counts: BTreeMap<String, usize> = BTreeMap::new();
        for task in project_tasks {
            for label in &task.labels {
                *label_counts.entry(label.clone()).or_insert(0) += 1;
            }
            if let Some(due) = parse_due(task) {
                if due < today {
                    overdue += 1;
                }
                if next_due.is_none_or(|current| due < current) {
                    next_due = Some(due);
                }
            }
        }

        let top_labels = top_counts(&label_counts, 5)
            .iter()
            .map(|(label, _)| *label)
            .collect::<Vec<_>>()
            .join(", ");

        lines.extend([
            String::new(),
            format!("## {name}"),
            format!("- Task count: {}", project_tasks.len()),
            format!("- Overdue count: {overdue}"),
            format!(
                "- Next due date: {}",
                next_due.map_or_else(|| "None".to_string(), |d| d.to_string())
            ),
            format!(
                "- Top labels: {}",
                if top_labels.is_empty() {
                    "None"
                } else {
                    top_labels.as_str()
                }
            ),
        ]);
    }

    lines.join("\n") + "\n"
}

/// Render the top-urgency table.
pub fn build_tasks_top_md(tasks: &[Task], today: NaiveDate) -> String {
    let mut lines = vec![
        "# Top Tasks (by urgency)".to_string(),
        String::new(),
        "| ID | Project | Due | Labels | Priority | Content |".to_string(),
        "| --- | --- | --- | --- | --- | --- |".to_string(),
    ];

    for task in urgency_order(tasks, today, TOP_TASKS_LIMIT) {
        let due_value = task
            .due
            .as_ref()
            .and_then(|due| due.datetime.as_deref().or(due.date.as_deref()))
            .unwrap_or("");
        lines.push(format!(
            "| {} | {} | {} | {} | {} | {} |",
            task.id,
            task.project_name.as_deref().unwrap_or(NO_PROJECT),
            due_value,
            task.labels.join(", "),
            task.priority,
            task.content,
        ));
    }

    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DueInfo;

    fn task(id: &str, content: &str, project: Option<&str>, labels: &[&str]) -> Task {
        Task {
            id: id.to_string(),
            content: content.to_string(),
            description: None,
            project_id: None,
            project_name: project.map(str::to_string),
            labels: labels.iter().map(|s| s.to_string()).collect(),
            priority: 1,
            due: None,
            created_at: None,
            url: None,
        }
    }

    fn dated(mut t: Task, date: &str) -> Task {
        t.due = Some(DueInfo {
            date: Some(date.to_string()),
            datetime: None,
            timezone: None,
            display: None,
        });
        t
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn projects() -> Vec<Project> {
        vec![
            Project {
                id: "10".to_string(),
                name: "Alpha".to_string(),
            },
            Project {
                id: "11".to_string(),
                name: "Beta".to_string(),
            },
        ]
    }

    #[test]
    fn test_summary_sections_present() {
        let tasks = vec![
            task("1", "Plan roadmap", Some("Alpha"), &["urgent"]),
            task("2", "Waiting for vendor", Some("Beta"), &[]),
        ];
        let md = build_summary_md(&tasks, &projects(), day("2024-06-15"));

        assert!(md.contains("# Summary"));
        assert!(md.contains("- Tasks: 2"));
        assert!(md.contains("- Projects: 2"));
        assert!(md.contains("## Due distribution"));
        assert!(md.contains("- urgent: 1"));
        // Vague and blocked candidates list the matching tasks
        assert!(md.contains("- 1: Plan roadmap"));
        assert!(md.contains("- 2: Waiting for vendor"));
    }

    #[test]
    fn test_summary_empty_sections_say_none() {
        let md = build_summary_md(&[], &[], day("2024-06-15"));
        assert!(md.contains("## Vague tasks\n- None"));
        assert!(md.contains("## Waiting/Blocked candidates\n- None"));
        assert!(md.contains("## Projects with many no-due tasks\n- None"));
    }

    #[test]
    fn test_projects_report_covers_empty_projects() {
        let tasks = vec![
            dated(task("1", "a", Some("Alpha"), &["x"]), "2024-06-01"),
            task("2", "b", None, &[]),
        ];
        let md = build_projects_md(&tasks, &projects(), day("2024-06-15"));

        assert!(md.contains("## Alpha"));
        assert!(md.contains("- Overdue count: 1"));
        assert!(md.contains("- Next due date: 2024-06-01"));
        // Beta has no tasks but still gets a section
        assert!(md.contains("## Beta\n- Task count: 0"));
        assert!(md.contains(&format!("## {NO_PROJECT}")));
    }

    #[test]
    fn test_top_tasks_table_ordered_by_urgency() {
        let tasks = vec![
            task("undated", "later", Some("Alpha"), &[]),
            dated(task("overdue", "fix", Some("Alpha"), &["ops"]), "2024-06-01"),
            dated(task("soon", "ship", Some("Beta"), &[]), "2024-06-20"),
        ];
        let md = build_tasks_top_md(&tasks, day("2024-06-15"));

        let overdue_pos = md.find("| overdue |").unwrap();
        let soon_pos = md.find("| soon |").unwrap();
        let undated_pos = md.find("| undated |").unwrap();
        assert!(overdue_pos < soon_pos && soon_pos < undated_pos);
        assert!(md.contains("| overdue | Alpha | 2024-06-01 | ops | 1 | fix |"));
    }
}
