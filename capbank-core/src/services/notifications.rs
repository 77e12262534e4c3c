//! Notification queue
//!
//! Ordered list of short-lived messages. Each `show` appends and schedules
//! its own removal on the tokio timer; `dismiss` removes right away, which
//! turns the pending timer into a no-op.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use crate::domain::{Notification, Severity, DEFAULT_NOTIFICATION_DURATION};

#[derive(Debug, Clone)]
pub struct NotificationQueue {
    items: Arc<Mutex<Vec<Notification>>>,
    default_duration: Duration,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_DURATION)
    }
}

impl NotificationQueue {
    pub fn new(default_duration: Duration) -> Self {
        Self {
            items: Arc::new(Mutex::new(Vec::new())),
            default_duration,
        }
    }

    pub fn default_duration(&self) -> Duration {
        self.default_duration
    }

    /// Append a notification and schedule its removal. Returns its id.
    ///
    /// Outside a tokio runtime nothing is scheduled and the notification
    /// stays until dismissed or cleared.
    pub fn show(&self, message: impl Into<String>, severity: Severity, duration: Duration) -> String {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            message: message.into(),
            severity,
            duration,
        };
        let id = notification.id.clone();

        if let Ok(mut items) = self.items.lock() {
            items.push(notification);
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let queue = self.clone();
                let expired = id.clone();
                handle.spawn(async move {
                    tokio::time::sleep(duration).await;
                    queue.remove(&expired);
                });
            }
            Err(_) => debug!(id = %id, "no runtime, notification will not expire"),
        }

        id
    }

    pub fn info(&self, message: impl Into<String>) -> String {
        self.show(message, Severity::Info, self.default_duration)
    }

    pub fn success(&self, message: impl Into<String>) -> String {
        self.show(message, Severity::Success, self.default_duration)
    }

    pub fn warning(&self, message: impl Into<String>) -> String {
        self.show(message, Severity::Warning, self.default_duration)
    }

    pub fn error(&self, message: impl Into<String>) -> String {
        self.show(message, Severity::Error, self.default_duration)
    }

    /// Remove a notification now. Returns false if it was already gone.
    pub fn dismiss(&self, id: &str) -> bool {
        self.remove(id)
    }

    pub fn clear(&self) {
        if let Ok(mut items) = self.items.lock() {
            items.clear();
        }
    }

    /// Current notifications in insertion order
    pub fn snapshot(&self) -> Vec<Notification> {
        self.items
            .lock()
            .map(|items| items.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove(&self, id: &str) -> bool {
        let Ok(mut items) = self.items.lock() else {
            return false;
        };
        let before = items.len();
        items.retain(|n| n.id != id);
        before != items.len()
    }
}
