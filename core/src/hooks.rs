//! Collaborators the stores report to: user-facing notifications and
//! navigation. Both are injected; the defaults only log.

use std::time::Duration;

use tracing::info;

pub const LOGIN_ROUTE: &str = "/login";
pub const DASHBOARD_ROUTE: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Positive,
    Negative,
    Warning,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub timeout: Option<Duration>,
}

impl Notification {
    pub fn positive(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Positive)
    }

    pub fn negative(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Negative)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Warning)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn new(message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            message: message.into(),
            kind,
            timeout: None,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        info!(kind = ?notification.kind, "{}", notification.message);
    }
}

/// Writes navigation requests to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, route: &str) {
        info!(route, "navigate");
    }
}
