//! Heuristic task classification.
//!
//! Pure, stateless functions over a single task's visible fields. No
//! learning, no external calls; results are deterministic for a given
//! content/label pair.

/// Low-specificity verb phrases that mark a short task as vague.
/// Prefix match only, so "planning" matches "plan".
const VAGUE_PREFIXES: [&str; 7] = [
    "plan",
    "figure out",
    "deal with",
    "work on",
    "organize",
    "look into",
    "think about",
];

/// Substrings anywhere in the content that suggest the task is waiting on
/// something external.
const BLOCKED_PHRASES: [&str; 5] = ["waiting for", "follow up", "blocked", "stuck", "pending"];

/// Labels that mark a task as blocked regardless of content.
const BLOCKED_LABELS: [&str; 4] = ["waiting", "blocked", "waiting-for", "follow-up"];

/// True if the content is short (at most 6 words) and starts with a
/// low-specificity verb phrase. Empty content is not vague.
pub fn is_vague(content: &str) -> bool {
    let normalized = content.trim().to_lowercase();
    if normalized.is_empty() {
        return false;
    }
    if normalized.split_whitespace().count() > 6 {
        return false;
    }
    VAGUE_PREFIXES
        .iter()
        .any(|prefix| normalized.starts_with(prefix))
}

/// True if the content contains a blocked phrase anywhere, or any label is
/// in the blocked-label set. Case-insensitive on both.
pub fn is_blocked(content: &str, labels: &[String]) -> bool {
    let normalized = content.trim().to_lowercase();
    if BLOCKED_PHRASES
        .iter()
        .any(|phrase| normalized.contains(phrase))
    {
        return true;
    }
    labels
        .iter()
        .any(|label| BLOCKED_LABELS.contains(&label.trim().to_lowercase().as_str()))
}
