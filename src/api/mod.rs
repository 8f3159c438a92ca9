//! Todoist REST API client.
//!
//! The fetch surface is deliberately narrow - three list operations behind
//! the [`TaskSource`] trait - so the snapshot pipeline can be driven from
//! in-memory fixtures in tests and never touches the network there.

use serde_json::Value;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Todoist REST API base URL.
const TODOIST_API_BASE: &str = "https://api.todoist.com/rest/v2";

/// Per-request timeout handed to the HTTP agent.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum attempts for a single request when rate-limited.
const MAX_ATTEMPTS: u32 = 5;

/// Errors from the fetch layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Token rejected (401 Unauthorized)
    #[error("unauthorized (HTTP 401)")]
    Unauthorized,

    /// Any other non-2xx response, after retries
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    /// Transport-level failure
    #[error("network error: {0}")]
    Network(String),

    /// Response body was not the expected JSON
    #[error("failed to parse response: {0}")]
    Parse(String),
}

/// Source of raw task/project/label records.
///
/// Each operation returns ordered, opaque key-valued records; field names
/// are assumed but not validated beyond what the normalizer reads.
pub trait TaskSource {
    /// List all active tasks.
    fn list_tasks(&self) -> Result<Vec<Value>, ApiError>;

    /// List all projects.
    fn list_projects(&self) -> Result<Vec<Value>, ApiError>;

    /// List all labels. Callers must tolerate failure here and degrade to
    /// labels inferred from tasks.
    fn list_labels(&self) -> Result<Vec<Value>, ApiError>;
}

/// Blocking client for the Todoist REST API.
pub struct TodoistClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
}

impl TodoistClient {
    /// Create a client authenticated with the given API token.
    pub fn new(token: &str) -> Self {
        Self::with_base_url(token, TODOIST_API_BASE)
    }

    /// Create a client against a non-default base URL (used by tests).
    pub fn with_base_url(token: &str, base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Issue a GET, retrying on HTTP 429 with the server-provided delay or a
    /// doubling 1-second default, capped at [`MAX_ATTEMPTS`]. The final
    /// response (or error) is surfaced as-is.
    fn request(&self, path: &str, params: &[(&str, &str)]) -> Result<ureq::Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut backoff = 1.0_f64;
        let mut attempt = 0;
        loop {
            let mut req = self
                .agent
                .get(&url)
                .set("Authorization", &format!("Bearer {}", self.token));
            for (key, value) in params {
                req = req.query(key, value);
            }

            match req.call() {
                Ok(resp) => return Ok(resp),
                Err(ureq::Error::Status(429, resp)) if attempt + 1 < MAX_ATTEMPTS => {
                    let wait = resp
                        .header("Retry-After")
                        .and_then(|v| v.parse::<f64>().ok())
                        .unwrap_or(backoff);
                    thread::sleep(Duration::from_secs_f64(wait));
                    backoff *= 2.0;
                    attempt += 1;
                }
                Err(ureq::Error::Status(401, _)) => return Err(ApiError::Unauthorized),
                Err(ureq::Error::Status(code, resp)) => {
                    let body = resp.into_string().unwrap_or_default();
                    return Err(ApiError::Status { code, body });
                }
                Err(e) => return Err(ApiError::Network(e.to_string())),
            }
        }
    }

    /// Fetch every page of a listing endpoint, following cursors until the
    /// server stops providing one.
    fn get_paginated(&self, path: &str) -> Result<Vec<Value>, ApiError> {
        let mut collected = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut params: Vec<(&str, &str)> = Vec::new();
            if let Some(c) = &cursor {
                params.push(("cursor", c.as_str()));
            }
            let resp = self.request(path, &params)?;
            let payload: Value = resp
                .into_json()
                .map_err(|e| ApiError::Parse(e.to_string()))?;

            let (items, next_cursor) = collect_page(payload);
            collected.extend(items);
            match next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(collected)
    }
}

impl TaskSource for TodoistClient {
    fn list_tasks(&self) -> Result<Vec<Value>, ApiError> {
        self.get_paginated("/tasks")
    }

    fn list_projects(&self) -> Result<Vec<Value>, ApiError> {
        self.get_paginated("/projects")
    }

    fn list_labels(&self) -> Result<Vec<Value>, ApiError> {
        self.get_paginated("/labels")
    }
}

/// Extract one page's items and continuation cursor from a listing payload.
///
/// A bare array is a complete result set. An object carries its items under
/// `items`, `results`, or `data`, and its cursor under `next_cursor` or
/// `cursor`. Anything else yields an empty page.
fn collect_page(payload: Value) -> (Vec<Value>, Option<String>) {
    match payload {
        Value::Array(items) => (items, None),
        Value::Object(mut map) => {
            let items = ["items", "results", "data"]
                .iter()
                .find_map(|key| match map.remove(*key) {
                    Some(Value::Array(items)) => Some(items),
                    _ => None,
                })
                .unwrap_or_default();
            let next = ["next_cursor", "cursor"].iter().find_map(|key| {
                map.get(*key)
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            });
            (items, next)
        }
        _ => (Vec::new(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collect_page_bare_array() {
        let (items, next) = collect_page(json!([{"id": 1}, {"id": 2}]));
        assert_eq!(items.len(), 2);
        assert!(next.is_none());
    }

    #[test]
    fn test_collect_page_object_with_results_and_cursor() {
        let (items, next) = collect_page(json!({
            "results": [{"id": 1}],
            "next_cursor": "abc"
        }));
        assert_eq!(items.len(), 1);
        assert_eq!(next.as_deref(), Some("abc"));
    }

    #[test]
    fn test_collect_page_items_key_and_plain_cursor() {
        let (items, next) = collect_page(json!({
            "items": [{"id": 1}, {"id": 2}, {"id": 3}],
            "cursor": "next-page"
        }));
        assert_eq!(items.len(), 3);
        assert_eq!(next.as_deref(), Some("next-page"));
    }

    #[test]
    fn test_collect_page_empty_cursor_ends_pagination() {
        let (items, next) = collect_page(json!({
            "data": [{"id": 1}],
            "next_cursor": ""
        }));
        assert_eq!(items.len(), 1);
        assert!(next.is_none());
    }

    #[test]
    fn test_collect_page_unexpected_payload() {
        let (items, next) = collect_page(json!("nonsense"));
        assert!(items.is_empty());
        assert!(next.is_none());

        let (items, next) = collect_page(json!({"unrelated": true}));
        assert!(items.is_empty());
        assert!(next.is_none());
    }
}
