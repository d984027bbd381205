//! Client-side state containers.

pub mod auth;
pub mod tasks;
pub mod user;

pub use auth::{AuthStatus, AuthStore};
pub use tasks::{TaskListState, TaskListStore};
pub use user::{UserState, UserStore};
