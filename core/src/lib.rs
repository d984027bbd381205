//! Client core for the tasks service.
//!
//! # Overview
//! Resource clients build `HttpRequest` values and parse `HttpResponse`
//! values without touching the network. An `ApiClient` executes them through
//! an injected `Transport`, adding the bearer token and ending the session on
//! a 401. Stores sit on top and hold the state a UI renders: the current page
//! of tasks, the signed-in person, and the profile.
//!
//! # Design
//! - `TaskClient` / `AccountClient` are stateless; `build_*` and `parse_*`
//!   keep the I/O boundary explicit and testable without a server.
//! - Server envelope quirks (`id` vs `entity_id`, `tasks` vs `data`) are
//!   resolved in `wire`; nothing above it sees them.
//! - Stores never return errors. Failures land in the store's `error` field
//!   and go out through the `Notifier`.
//! - `AppContext` wires one instance of everything per application session.

pub mod account;
pub mod api;
pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod hooks;
pub mod http;
pub mod session;
pub mod storage;
pub mod store;
pub mod transport;
pub mod types;
mod wire;

pub use account::AccountClient;
pub use api::ApiClient;
pub use app::AppContext;
pub use client::TaskClient;
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, StorageError, TransportError};
pub use hooks::{Navigator, Notification, NotificationKind, Notifier};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use session::Session;
pub use storage::{FileStorage, MemoryStorage, Persistence, StorageBackend};
pub use store::{AuthStore, TaskListState, TaskListStore, UserStore};
pub use transport::ReqwestTransport;
pub use types::{Filter, NewTask, Pagination, Person, Task, TaskId, TaskUpdate};
