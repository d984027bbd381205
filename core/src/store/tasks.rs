//! The task list store: one page of tasks matching the active filter, kept
//! in step with the server.
//!
//! # Design
//! - The page is authoritative from the server. Fetches replace `tasks` and
//!   the pagination counters wholesale; the client never pages locally.
//! - Mutations are applied locally only after the server confirms them, and
//!   are spliced in by identifier rather than re-fetching.
//! - Every fetch takes a generation number. When a response comes back and a
//!   newer fetch has been issued since, the response is dropped, so rapid
//!   page or filter changes cannot leave an older page on screen. Only the
//!   latest fetch clears `loading`.
//! - State sits behind an async mutex that is never held across a request.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::client::TaskClient;
use crate::error::ApiError;
use crate::hooks::{Notification, Notifier};
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{page_count, Filter, ListQuery, NewTask, Pagination, Task, TaskId, TaskUpdate};

const FETCH_FAILED: &str = "Failed to fetch tasks";
const FETCH_COMPLETED_FAILED: &str = "Failed to fetch completed tasks";
const FETCH_PENDING_FAILED: &str = "Failed to fetch pending tasks";
const ADD_FAILED: &str = "Failed to add task";
const UPDATE_FAILED: &str = "Failed to update task";
const DELETE_FAILED: &str = "Failed to delete task";

pub const TASK_ADDED: &str = "Task added successfully";
pub const TASK_UPDATED: &str = "Task updated successfully";
pub const TASK_DELETED: &str = "Task deleted successfully";

/// Observable state of the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListState {
    pub tasks: Vec<Task>,
    pub filter: Filter,
    pub pagination: Pagination,
    pub loading: bool,
    /// Message from the most recent failed operation; reset by each new one.
    pub error: Option<String>,
}

struct Inner {
    view: TaskListState,
    generation: u64,
}

type Parser<T> = fn(&TaskClient, HttpResponse) -> Result<T, ApiError>;

pub struct TaskListStore {
    api: ApiClient,
    client: TaskClient,
    notifier: Arc<dyn Notifier>,
    inner: Mutex<Inner>,
}

impl TaskListStore {
    pub fn new(api: ApiClient, client: TaskClient, notifier: Arc<dyn Notifier>, per_page: u32) -> Self {
        Self {
            api,
            client,
            notifier,
            inner: Mutex::new(Inner {
                view: TaskListState {
                    tasks: Vec::new(),
                    filter: Filter::All,
                    pagination: Pagination::new(per_page),
                    loading: false,
                    error: None,
                },
                generation: 0,
            }),
        }
    }

    pub async fn state(&self) -> TaskListState {
        self.inner.lock().await.view.clone()
    }

    pub async fn tasks(&self) -> Vec<Task> {
        self.inner.lock().await.view.tasks.clone()
    }

    /// The in-memory page narrowed to the active filter. Only differs from
    /// `tasks` after one of the unfiltered shortcut fetches.
    pub async fn filtered_tasks(&self) -> Vec<Task> {
        let inner = self.inner.lock().await;
        let filter = inner.view.filter;
        inner
            .view
            .tasks
            .iter()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect()
    }

    /// Fetches the current page for the current filter.
    pub async fn fetch_tasks(&self) {
        let (generation, query) = {
            let mut inner = self.inner.lock().await;
            let generation = inner.begin_fetch();
            let pagination = inner.view.pagination;
            let query = ListQuery {
                page: pagination.page,
                per_page: pagination.per_page,
                filter: inner.view.filter,
            };
            (generation, query)
        };

        let request = self.client.build_list_tasks(&query);
        let result = self.round_trip(Ok(request), TaskClient::parse_list_tasks).await;

        let mut inner = self.inner.lock().await;
        if !inner.finish_fetch(generation) {
            return;
        }
        match result {
            Ok(page) => {
                let pagination = &mut inner.view.pagination;
                match page.page_info {
                    Some(info) => {
                        pagination.page = info.page;
                        pagination.total = info.total;
                        pagination.total_pages = info
                            .total_pages
                            .unwrap_or_else(|| page_count(info.total, pagination.per_page));
                    }
                    None => {
                        // Unpaginated answer: everything is on the first page.
                        pagination.page = 1;
                        pagination.total = page.tasks.len() as u64;
                        pagination.total_pages = page_count(pagination.total, pagination.per_page);
                    }
                }
                inner.view.tasks = page.tasks;
            }
            Err(err) => {
                inner.view.tasks.clear();
                let message = err.user_message(FETCH_FAILED);
                inner.view.error = Some(message.clone());
                drop(inner);
                self.report(&err, message);
            }
        }
    }

    /// Switches the filter and reloads from the first page.
    pub async fn set_filter(&self, filter: Filter) {
        {
            let mut inner = self.inner.lock().await;
            inner.view.filter = filter;
            inner.view.pagination.page = 1;
        }
        self.fetch_tasks().await;
    }

    /// Moves to `page` and reloads. Pages are numbered from 1; zero is
    /// treated as 1. There is no upper bound check against `total_pages`.
    pub async fn set_page(&self, page: u32) {
        {
            let mut inner = self.inner.lock().await;
            inner.view.pagination.page = page.max(1);
        }
        self.fetch_tasks().await;
    }

    /// Creates a task and, once the server confirms it, puts it at the front
    /// of the current page. The page may then hold more than `per_page`
    /// tasks until the next fetch.
    pub async fn add_task(&self, title: &str, description: &str) -> bool {
        self.clear_error().await;
        let input = NewTask {
            title: title.to_string(),
            description: description.to_string(),
        };
        let request = self.client.build_create_task(&input);
        match self.round_trip(request, TaskClient::parse_task).await {
            Ok(task) => {
                {
                    let mut inner = self.inner.lock().await;
                    inner.view.tasks.insert(0, task);
                    inner.view.pagination.total += 1;
                    inner.view.pagination.recompute_pages();
                }
                self.notifier.notify(Notification::positive(TASK_ADDED));
                true
            }
            Err(err) => self.fail(err, ADD_FAILED).await,
        }
    }

    /// Sends a full update and swaps the returned task into the page.
    pub async fn update_task(&self, id: &TaskId, updates: &TaskUpdate) -> bool {
        self.clear_error().await;
        let request = self.client.build_update_task(id, updates);
        self.apply_update(id, request).await
    }

    /// Patches only the completion flag.
    pub async fn toggle_task_completion(&self, id: &TaskId, is_completed: bool) -> bool {
        self.clear_error().await;
        let request = self.client.build_set_completion(id, is_completed);
        self.apply_update(id, request).await
    }

    /// Deletes a task and drops it from the page.
    ///
    /// `total`, `total_pages`, and `page` are left as they were: the page can
    /// be short and the counters stale until the next fetch.
    pub async fn delete_task(&self, id: &TaskId) -> bool {
        self.clear_error().await;
        let request = self.client.build_delete_task(id);
        match self.round_trip(Ok(request), TaskClient::parse_delete_task).await {
            Ok(()) => {
                self.inner.lock().await.view.tasks.retain(|task| task.id != *id);
                self.notifier.notify(Notification::positive(TASK_DELETED));
                true
            }
            Err(err) => self.fail(err, DELETE_FAILED).await,
        }
    }

    /// Replaces the page with every completed task. Pagination is untouched.
    pub async fn fetch_completed_tasks(&self) {
        let request = self.client.build_list_completed();
        self.fetch_unpaginated(request, FETCH_COMPLETED_FAILED).await;
    }

    /// Replaces the page with every pending task. Pagination is untouched.
    pub async fn fetch_pending_tasks(&self) {
        let request = self.client.build_list_pending();
        self.fetch_unpaginated(request, FETCH_PENDING_FAILED).await;
    }

    async fn fetch_unpaginated(&self, request: HttpRequest, fallback: &str) {
        let generation = self.inner.lock().await.begin_fetch();
        let result = self.round_trip(Ok(request), TaskClient::parse_task_list).await;

        let mut inner = self.inner.lock().await;
        if !inner.finish_fetch(generation) {
            return;
        }
        match result {
            Ok(tasks) => inner.view.tasks = tasks,
            Err(err) => {
                inner.view.tasks.clear();
                let message = err.user_message(fallback);
                inner.view.error = Some(message.clone());
                drop(inner);
                self.report(&err, message);
            }
        }
    }

    async fn apply_update(&self, id: &TaskId, request: Result<HttpRequest, ApiError>) -> bool {
        match self.round_trip(request, TaskClient::parse_task).await {
            Ok(task) => {
                {
                    let mut inner = self.inner.lock().await;
                    match inner.view.tasks.iter_mut().find(|t| t.id == *id) {
                        Some(slot) => *slot = task,
                        None => debug!(%id, "updated task is not on the current page"),
                    }
                }
                self.notifier.notify(Notification::positive(TASK_UPDATED));
                true
            }
            Err(err) => self.fail(err, UPDATE_FAILED).await,
        }
    }

    async fn round_trip<T>(
        &self,
        request: Result<HttpRequest, ApiError>,
        parse: Parser<T>,
    ) -> Result<T, ApiError> {
        let response = self.api.send(request?).await?;
        parse(&self.client, response)
    }

    async fn clear_error(&self) {
        self.inner.lock().await.view.error = None;
    }

    async fn fail(&self, err: ApiError, fallback: &str) -> bool {
        let message = err.user_message(fallback);
        self.inner.lock().await.view.error = Some(message.clone());
        self.report(&err, message);
        false
    }

    fn report(&self, err: &ApiError, message: String) {
        warn!(%err, "task operation failed");
        self.notifier.notify(Notification::negative(message));
    }
}

impl Inner {
    fn begin_fetch(&mut self) -> u64 {
        self.generation += 1;
        self.view.loading = true;
        self.view.error = None;
        self.generation
    }

    /// Returns false when a newer fetch has superseded `generation`.
    fn finish_fetch(&mut self, generation: u64) -> bool {
        if self.generation != generation {
            debug!(generation, latest = self.generation, "discarding superseded fetch");
            return false;
        }
        self.view.loading = false;
        true
    }
}
