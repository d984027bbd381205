//! Domain types for the task and account APIs.
//!
//! # Design
//! These are the canonical client-side shapes. Whatever the server sends is
//! translated into them by the adapters in `wire`, so stores never see the
//! `id` / `entity_id` split or the `tasks` / `data` envelope variants.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical task identifier.
///
/// Servers have used both string and integer identifiers; both are kept as
/// their textual form so they can be compared and placed in URL paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for TaskId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// A single task as held by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
}

/// Request payload for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Request payload for a full task update. Omitted fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

/// Which tasks the list view asks the server for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    /// Value of the `is_completed` query parameter, if the filter sends one.
    pub fn is_completed_param(self) -> Option<u8> {
        match self {
            Filter::All => None,
            Filter::Active => Some(0),
            Filter::Completed => Some(1),
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.is_completed,
            Filter::Completed => task.is_completed,
        }
    }
}

/// Pagination cursor for the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Pagination {
    pub fn new(per_page: u32) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
            total: 0,
            total_pages: 0,
        }
    }

    /// Recompute `total_pages` from `total` and `per_page`.
    pub fn recompute_pages(&mut self) {
        self.total_pages = page_count(self.total, self.per_page);
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(10)
    }
}

/// `ceil(total / per_page)`, treating a zero page size as one.
pub fn page_count(total: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page.max(1));
    u32::try_from(total.div_ceil(per_page)).unwrap_or(u32::MAX)
}

/// Query for the paginated task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    pub filter: Filter,
}

/// Server-reported position of a fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page: u32,
    pub total: u64,
    /// `None` when the server sent neither `total_pages` nor `per_page`; the
    /// caller derives it from its own page size.
    pub total_pages: Option<u32>,
}

/// One page of tasks plus the server's pagination report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub page_info: Option<PageInfo>,
}

/// Profile of the signed-in person. Fields the client does not model are
/// kept in `extra` so they survive a round-trip through storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Data returned by login, password reset, and the profile endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionGrant {
    pub person: Option<Person>,
    pub access_token: Option<String>,
    /// Opaque to the client; stored and handed back as received.
    pub expiry: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPassword {
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(5, 2), 3);
        assert_eq!(page_count(4, 2), 2);
        assert_eq!(page_count(0, 10), 0);
    }

    #[test]
    fn page_count_tolerates_zero_page_size() {
        assert_eq!(page_count(3, 0), 3);
    }

    #[test]
    fn filter_query_values() {
        assert_eq!(Filter::All.is_completed_param(), None);
        assert_eq!(Filter::Active.is_completed_param(), Some(0));
        assert_eq!(Filter::Completed.is_completed_param(), Some(1));
    }

    #[test]
    fn task_update_skips_missing_fields() {
        let update = TaskUpdate {
            title: Some("Renamed".to_string()),
            ..TaskUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "Renamed" }));
    }

    #[test]
    fn person_keeps_unknown_fields() {
        let person: Person =
            serde_json::from_str(r#"{"email":"a@b.c","first_name":"Ada","id":7}"#).unwrap();
        assert_eq!(person.first_name.as_deref(), Some("Ada"));
        assert_eq!(person.extra["id"], 7);
        let back = serde_json::to_value(&person).unwrap();
        assert_eq!(back["id"], 7);
    }
}
