//! User-facing notifications (toasts).

use std::cell::RefCell;
use std::fmt;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Info => "info",
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(level: Level, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Level::Error, title, message)
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Level::Success, title, message)
    }

    /// Toast for a failed backend call.
    pub fn from_error(err: &ApiError) -> Self {
        let title = match err {
            e if e.is_unauthorized() => "Session expired",
            ApiError::Transport(_) => "Network error",
            _ => "Error",
        };
        Self::error(title, err.user_message())
    }
}

/// Where notifications go. The UI shell decides how to show them.
pub trait Notifier {
    fn notify(&self, notification: &Notification);
}

/// Emits notifications as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: &Notification) {
        match n.level {
            Level::Error => tracing::error!(title = %n.title, "{}", n.message),
            Level::Warning => tracing::warn!(title = %n.title, "{}", n.message),
            Level::Info | Level::Success => tracing::info!(level = %n.level, title = %n.title, "{}", n.message),
        }
    }
}

/// Keeps every notification in memory, for headless use and tests.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: RefCell<Vec<Notification>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Notification> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: &Notification) {
        self.entries.borrow_mut().push(notification.clone());
    }
}
