//! User-facing notifications (toasts).
//!
//! The orchestrators emit [`Notification`]s into a [`NotificationSink`]; the
//! rendering layer decides how to show them. [`ToastQueue`] keeps the visible
//! stack in memory, [`TracingNotifier`] mirrors every toast into the log.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title and body text of a toast, as configured on a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
}

impl Toast {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// `"Success"` toast with the given body.
    pub fn success(description: impl Into<String>) -> Self {
        Self::new("Success", description)
    }

    /// `"Error"` toast with the given body.
    pub fn error(description: impl Into<String>) -> Self {
        Self::new("Error", description)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

impl NotificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

/// A toast as emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, toast: &Toast) -> Self {
        Self {
            level,
            title: toast.title.clone(),
            description: toast.description.clone(),
            timestamp: Utc::now(),
        }
    }
}

/// Anything that can display a toast.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<S: NotificationSink + ?Sized> NotificationSink for Arc<S> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

/// Logs every toast through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, n: Notification) {
        match n.level {
            NotificationLevel::Error => {
                tracing::warn!(title = %n.title, description = %n.description, "Toast")
            }
            _ => tracing::info!(
                level = n.level.as_str(),
                title = %n.title,
                description = %n.description,
                "Toast",
            ),
        }
    }
}

/// Default number of toasts kept on screen.
const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// In-memory toast stack. Oldest toasts fall off once `capacity` is reached.
#[derive(Debug)]
pub struct ToastQueue {
    items: Mutex<VecDeque<Notification>>,
    capacity: usize,
}

impl ToastQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    /// Current toasts, oldest first.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.lock().iter().cloned().collect()
    }

    /// Remove and return all toasts.
    pub fn drain(&self) -> Vec<Notification> {
        self.lock().drain(..).collect()
    }

    pub fn count(&self, level: NotificationLevel) -> usize {
        self.lock().iter().filter(|n| n.level == level).count()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Notification>> {
        // A poisoned queue still holds valid toasts.
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl NotificationSink for ToastQueue {
    fn notify(&self, notification: Notification) {
        let mut items = self.lock();
        if items.len() == self.capacity {
            items.pop_front();
        }
        items.push_back(notification);
    }
}

/// Forwards each toast to several sinks.
#[derive(Default, Clone)]
pub struct FanoutNotifier {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl FanoutNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl NotificationSink for FanoutNotifier {
    fn notify(&self, notification: Notification) {
        for sink in &self.sinks {
            sink.notify(notification.clone());
        }
    }
}
