//! Stateless HTTP request builder and response parser for the tasks resource.
//!
//! # Design
//! `TaskClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Envelope and identifier differences between endpoints are absorbed by the
//! `wire` adapters, so every parser returns canonical types.

use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ListQuery, NewTask, Task, TaskId, TaskPage, TaskUpdate};
use crate::wire::{self, Empty, ListBody, TaskBody};

/// Stateless client for the `/tasks` resource.
#[derive(Debug, Clone)]
pub struct TaskClient {
    base_url: String,
}

#[derive(Serialize)]
struct CompletionPatch {
    is_completed: bool,
}

impl TaskClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_list_tasks(&self, query: &ListQuery) -> HttpRequest {
        let mut path = format!(
            "{}/tasks?page={}&per_page={}",
            self.base_url, query.page, query.per_page
        );
        if let Some(flag) = query.filter.is_completed_param() {
            path.push_str(&format!("&is_completed={flag}"));
        }
        get(path)
    }

    pub fn build_get_task(&self, id: &TaskId) -> HttpRequest {
        get(format!("{}/tasks/{id}", self.base_url))
    }

    pub fn build_create_task(&self, input: &NewTask) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Post, format!("{}/tasks", self.base_url), input)
    }

    pub fn build_update_task(&self, id: &TaskId, input: &TaskUpdate) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Put, format!("{}/tasks/{id}", self.base_url), input)
    }

    pub fn build_set_completion(&self, id: &TaskId, is_completed: bool) -> Result<HttpRequest, ApiError> {
        json_request(
            HttpMethod::Patch,
            format!("{}/tasks/{id}", self.base_url),
            &CompletionPatch { is_completed },
        )
    }

    pub fn build_delete_task(&self, id: &TaskId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/tasks/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_list_completed(&self) -> HttpRequest {
        get(format!("{}/tasks/completed", self.base_url))
    }

    pub fn build_list_pending(&self) -> HttpRequest {
        get(format!("{}/tasks/pending", self.base_url))
    }

    pub fn parse_list_tasks(&self, response: HttpResponse) -> Result<TaskPage, ApiError> {
        wire::open::<ListBody>(&response).and_then(wire::task_page)
    }

    /// Parses the unpaginated `completed` / `pending` listings.
    pub fn parse_task_list(&self, response: HttpResponse) -> Result<Vec<Task>, ApiError> {
        wire::open::<ListBody>(&response).and_then(wire::task_list)
    }

    /// Parses get, create, update, and completion-toggle responses.
    pub fn parse_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        wire::open::<TaskBody>(&response).and_then(wire::single_task)
    }

    pub fn parse_delete_task(&self, response: HttpResponse) -> Result<(), ApiError> {
        wire::open::<Empty>(&response).map(|_| ())
    }
}

pub(crate) fn get(path: String) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        path,
        headers: Vec::new(),
        body: None,
    }
}

pub(crate) fn json_request<T: Serialize>(
    method: HttpMethod,
    path: String,
    input: &T,
) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(input).map_err(|e| ApiError::Encode(e.to_string()))?;
    Ok(HttpRequest {
        method,
        path,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}
