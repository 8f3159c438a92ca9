//! Due-date analysis: parsing, bucketing, urgency ordering, planning debt.
//!
//! "today" is always passed in by the caller (the invocation instant) so
//! these functions stay pure. Malformed upstream date strings are recovered
//! as "no due date" for that task, silently - they are not under this tool's
//! control.

use crate::models::{NO_PROJECT, Task};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

/// Resolve a task's effective due date.
///
/// The plain `date` field wins: if it is present, its parse result is final
/// and an unparsable value means "no due date" with no fallback to
/// `datetime`. Only when `date` is absent is `datetime` consulted, taking
/// its date component.
pub fn parse_due(task: &Task) -> Option<NaiveDate> {
    let due = task.due.as_ref()?;
    if let Some(date) = &due.date {
        return date.parse::<NaiveDate>().ok();
    }
    if let Some(datetime) = &due.datetime {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(datetime) {
            return Some(parsed.date_naive());
        }
        return datetime.parse::<NaiveDateTime>().ok().map(|dt| dt.date());
    }
    None
}

/// Distribution of tasks over due-date windows relative to a reference day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DueBuckets {
    pub overdue: usize,
    pub due_today: usize,
    pub due_next_7: usize,
    pub due_next_30: usize,
    pub no_due: usize,
}

/// Bucket tasks by distance of their due date from `today`. Window upper
/// bounds are inclusive. Tasks due beyond 30 days are counted under
/// `no_due` together with undated tasks - an intentional simplification.
pub fn due_buckets(tasks: &[Task], today: NaiveDate) -> DueBuckets {
    let mut buckets = DueBuckets::default();
    for task in tasks {
        match parse_due(task) {
            None => buckets.no_due += 1,
            Some(due) if due < today => buckets.overdue += 1,
            Some(due) if due == today => buckets.due_today += 1,
            Some(due) if due <= today + Duration::days(7) => buckets.due_next_7 += 1,
            Some(due) if due <= today + Duration::days(30) => buckets.due_next_30 += 1,
            Some(_) => buckets.no_due += 1,
        }
    }
    buckets
}

/// Order tasks by urgency and return at most `limit` of them.
///
/// Sort key is `(rank, due date)`: overdue tasks first, then every dated
/// future task in date order (the 30-day window only matters for bucketing,
/// not for ordering), then undated tasks. The sort is stable, and undated
/// tasks share `NaiveDate::MAX` as their date key, so their original
/// relative order is preserved.
pub fn urgency_order<'a>(tasks: &'a [Task], today: NaiveDate, limit: usize) -> Vec<&'a Task> {
    let mut ordered: Vec<&Task> = tasks.iter().collect();
    ordered.sort_by_key(|task| match parse_due(task) {
        Some(due) if due < today => (0u8, due),
        Some(due) => (1, due),
        None => (2, NaiveDate::MAX),
    });
    ordered.truncate(limit);
    ordered
}

/// Projects carrying planning debt: at least 5 tasks with no due date, and
/// at least half of the project's tasks undated. Sorted by undated count,
/// descending; tasks without a project group under `NO_PROJECT`.
pub fn planning_debt(tasks: &[Task]) -> Vec<(String, usize, usize)> {
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for task in tasks {
        let name = task.project_name.as_deref().unwrap_or(NO_PROJECT);
        let entry = counts.entry(name).or_default();
        entry.1 += 1;
        if parse_due(task).is_none() {
            entry.0 += 1;
        }
    }

    let mut debt: Vec<(String, usize, usize)> = counts
        .into_iter()
        .filter(|&(_, (no_due, total))| no_due >= 5 && no_due as f64 / total as f64 >= 0.5)
        .map(|(name, (no_due, total))| (name.to_string(), no_due, total))
        .collect();
    debt.sort_by(|a, b| b.1.cmp(&a.1));
    debt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DueInfo;

    fn task_due(id: &str, date: Option<&str>, datetime: Option<&str>) -> Task {
        Task {
            id: id.to_string(),
            content: format!("task {id}"),
            description: None,
            project_id: None,
            project_name: None,
            labels: Vec::new(),
            priority: 1,
            due: if date.is_none() && datetime.is_none() {
                None
            } else {
                Some(DueInfo {
                    date: date.map(str::to_string),
                    datetime: datetime.map(str::to_string),
                    timezone: None,
                    display: None,
                })
            },
            created_at: None,
            url: None,
        }
    }

    fn task_in_project(id: &str, project: &str, date: Option<&str>) -> Task {
        let mut task = task_due(id, date, None);
        task.project_name = Some(project.to_string());
        task
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_due_prefers_date() {
        let task = task_due("1", Some("2024-03-01"), Some("2024-06-01T10:00:00"));
        assert_eq!(parse_due(&task), Some(day("2024-03-01")));
    }

    #[test]
    fn test_parse_due_bad_date_does_not_fall_back_to_datetime() {
        let task = task_due("1", Some("not-a-date"), Some("2024-06-01T10:00:00"));
        assert_eq!(parse_due(&task), None);
    }

    #[test]
    fn test_parse_due_uses_datetime_when_date_absent() {
        let naive = task_due("1", None, Some("2024-06-01T10:00:00"));
        assert_eq!(parse_due(&naive), Some(day("2024-06-01")));

        let zoned = task_due("2", None, Some("2024-06-01T23:30:00Z"));
        assert_eq!(parse_due(&zoned), Some(day("2024-06-01")));
    }

    #[test]
    fn test_parse_due_absent_cases() {
        assert_eq!(parse_due(&task_due("1", None, None)), None);
        assert_eq!(parse_due(&task_due("2", None, Some("garbage"))), None);
        // Due block present but both fields unset
        let mut task = task_due("3", None, None);
        task.due = Some(DueInfo::default());
        assert_eq!(parse_due(&task), None);
    }

    #[test]
    fn test_due_buckets_distribution() {
        let today = day("2024-06-15");
        let tasks = vec![
            task_due("overdue", Some("2024-06-10"), None),
            task_due("today", Some("2024-06-15"), None),
            task_due("soon", Some("2024-06-18"), None),
            task_due("later", Some("2024-07-05"), None),
            task_due("none", None, None),
        ];

        let buckets = due_buckets(&tasks, today);
        assert_eq!(buckets.overdue, 1);
        assert_eq!(buckets.due_today, 1);
        assert_eq!(buckets.due_next_7, 1);
        assert_eq!(buckets.due_next_30, 1);
        assert_eq!(buckets.no_due, 1);
    }

    #[test]
    fn test_due_buckets_boundaries_inclusive() {
        let today = day("2024-06-15");
        let tasks = vec![
            task_due("edge7", Some("2024-06-22"), None),
            task_due("edge30", Some("2024-07-15"), None),
            task_due("past30", Some("2024-07-16"), None),
        ];

        let buckets = due_buckets(&tasks, today);
        assert_eq!(buckets.due_next_7, 1);
        assert_eq!(buckets.due_next_30, 1);
        // Far-future tasks land with undated ones
        assert_eq!(buckets.no_due, 1);
    }

    #[test]
    fn test_urgency_order_overdue_first_then_dated_then_undated() {
        let today = day("2024-06-15");
        let tasks = vec![
            task_due("undated-a", None, None),
            task_due("next-week", Some("2024-06-20"), None),
            task_due("overdue", Some("2024-06-01"), None),
            task_due("far-future", Some("2024-09-01"), None),
            task_due("undated-b", None, None),
        ];

        let ordered: Vec<&str> = urgency_order(&tasks, today, 100)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(
            ordered,
            vec!["overdue", "next-week", "far-future", "undated-a", "undated-b"]
        );
    }

    #[test]
    fn test_urgency_order_respects_limit() {
        let today = day("2024-06-15");
        let tasks = vec![
            task_due("1", Some("2024-06-01"), None),
            task_due("2", Some("2024-06-02"), None),
            task_due("3", Some("2024-06-03"), None),
        ];
        assert_eq!(urgency_order(&tasks, today, 2).len(), 2);
    }

    #[test]
    fn test_planning_debt_thresholds() {
        let mut tasks = Vec::new();
        // 4 undated out of 4: below the 5-count floor, excluded
        for i in 0..4 {
            tasks.push(task_in_project(&format!("small-{i}"), "Small", None));
        }
        // 5 undated out of 8: >= 5 and >= 50%, included
        for i in 0..5 {
            tasks.push(task_in_project(&format!("big-{i}"), "Big", None));
        }
        for i in 0..3 {
            tasks.push(task_in_project(
                &format!("big-dated-{i}"),
                "Big",
                Some("2024-06-20"),
            ));
        }

        let debt = planning_debt(&tasks);
        assert_eq!(debt, vec![("Big".to_string(), 5, 8)]);
    }

    #[test]
    fn test_planning_debt_groups_missing_project_under_sentinel() {
        let tasks: Vec<Task> = (0..5)
            .map(|i| task_due(&format!("loose-{i}"), None, None))
            .collect();
        let debt = planning_debt(&tasks);
        assert_eq!(debt, vec![(NO_PROJECT.to_string(), 5, 5)]);
    }
}
