//! Adapters from the server's response shapes to the canonical types.
//!
//! The server wraps every payload in a `{ success, message, ... }` envelope,
//! and different endpoints (and schema versions) disagree on field names:
//! task identifiers arrive as `id` or `entity_id`, lists as `tasks` or
//! `data`, single tasks as `task` or `data`. Everything is folded into one
//! shape here.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ApiError;
use crate::http::HttpResponse;
use crate::types::{page_count, PageInfo, Person, SessionGrant, Task, TaskId, TaskPage};

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<B> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub body: B,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireId {
    Int(i64),
    Text(String),
}

impl From<WireId> for TaskId {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Int(n) => TaskId::from(n),
            WireId::Text(s) => TaskId::from(s),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireTask {
    #[serde(default)]
    pub id: Option<WireId>,
    #[serde(default)]
    pub entity_id: Option<WireId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
}

impl TryFrom<WireTask> for Task {
    type Error = ApiError;

    fn try_from(wire: WireTask) -> Result<Self, Self::Error> {
        let id = wire
            .entity_id
            .or(wire.id)
            .ok_or_else(|| ApiError::Decode("task is missing an identifier".to_string()))?;
        Ok(Task {
            id: id.into(),
            title: wire.title,
            description: wire.description.unwrap_or_default(),
            is_completed: wire.is_completed,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WirePagination {
    pub page: u32,
    #[serde(default)]
    pub per_page: Option<u32>,
    pub total: u64,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListBody {
    #[serde(default)]
    pub tasks: Option<Vec<WireTask>>,
    #[serde(default)]
    pub data: Option<Vec<WireTask>>,
    #[serde(default)]
    pub pagination: Option<WirePagination>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskBody {
    #[serde(default)]
    pub task: Option<WireTask>,
    #[serde(default)]
    pub data: Option<WireTask>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionBody {
    #[serde(default)]
    pub person: Option<Person>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expiry: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileBody {
    #[serde(default)]
    pub user: Option<Person>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Empty {}

/// Decode the envelope and return its body if the server reported success.
///
/// Non-JSON bodies on error statuses are not decode failures: they become
/// `Rejected` / `Unauthorized` without a message.
pub(crate) fn open<B: DeserializeOwned>(response: &HttpResponse) -> Result<B, ApiError> {
    if response.status == 401 {
        let message = serde_json::from_str::<Envelope<Empty>>(&response.body)
            .ok()
            .and_then(|envelope| envelope.message);
        return Err(ApiError::Unauthorized { message });
    }

    if !response.is_success() {
        let message = serde_json::from_str::<Envelope<Empty>>(&response.body)
            .ok()
            .and_then(|envelope| envelope.message);
        return Err(ApiError::Rejected {
            status: response.status,
            message,
        });
    }

    let envelope = match serde_json::from_str::<Envelope<B>>(&response.body) {
        Ok(envelope) => envelope,
        Err(err) => {
            // An unsuccessful envelope may omit the payload fields entirely.
            if let Ok(bare) = serde_json::from_str::<Envelope<Empty>>(&response.body) {
                if bare.success != Some(true) {
                    return Err(ApiError::Rejected {
                        status: response.status,
                        message: bare.message,
                    });
                }
            }
            return Err(ApiError::Decode(err.to_string()));
        }
    };

    if envelope.success != Some(true) {
        return Err(ApiError::Rejected {
            status: response.status,
            message: envelope.message,
        });
    }
    Ok(envelope.body)
}

fn convert_all(tasks: Vec<WireTask>) -> Result<Vec<Task>, ApiError> {
    tasks.into_iter().map(Task::try_from).collect()
}

pub(crate) fn task_page(body: ListBody) -> Result<TaskPage, ApiError> {
    let tasks = convert_all(body.tasks.or(body.data).unwrap_or_default())?;
    let page_info = body.pagination.map(|p| PageInfo {
        page: p.page,
        total: p.total,
        total_pages: p
            .total_pages
            .or_else(|| p.per_page.map(|per_page| page_count(p.total, per_page))),
    });
    Ok(TaskPage { tasks, page_info })
}

pub(crate) fn task_list(body: ListBody) -> Result<Vec<Task>, ApiError> {
    convert_all(body.data.or(body.tasks).unwrap_or_default())
}

pub(crate) fn single_task(body: TaskBody) -> Result<Task, ApiError> {
    body.task
        .or(body.data)
        .ok_or_else(|| ApiError::Decode("response carries no task".to_string()))
        .and_then(Task::try_from)
}

pub(crate) fn session_grant(body: SessionBody) -> SessionGrant {
    SessionGrant {
        person: body.person,
        access_token: body.access_token,
        expiry: body.expiry,
    }
}
