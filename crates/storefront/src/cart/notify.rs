//! Transient user notifications.
//!
//! Notifications are fire-and-forget: the cart manager hands them to a
//! [`Notifier`] and never looks at them again. The storefront collects them in
//! a [`NotificationFeed`] and shows whatever is still live on the next page
//! render; anything older than [`NOTIFICATION_TTL`] is discarded unseen.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// How long a notification stays visible.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Notification severity, mapped to alert styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Info,
    Danger,
}

impl NotificationLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Danger => "danger",
        }
    }
}

/// A single transient message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Create a notification stamped with the current time.
    #[must_use]
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    #[must_use]
    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Danger, message)
    }

    /// Whether the notification has outlived [`NOTIFICATION_TTL`] at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let ttl = chrono::Duration::from_std(NOTIFICATION_TTL).unwrap_or(chrono::Duration::MAX);
        now - self.created_at >= ttl
    }
}

/// Receives notifications emitted by the cart manager.
pub trait Notifier: Send {
    fn notify(&self, notification: Notification);
}

impl<F> Notifier for F
where
    F: Fn(Notification) + Send,
{
    fn notify(&self, notification: Notification) {
        self(notification);
    }
}

/// Logs notifications through `tracing` instead of displaying them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Danger => tracing::warn!("{}", notification.message),
            NotificationLevel::Success | NotificationLevel::Info => {
                tracing::info!("{}", notification.message);
            }
        }
    }
}

/// Shared buffer of pending notifications.
///
/// Cloning yields another handle to the same buffer.
#[derive(Debug, Clone, Default)]
pub struct NotificationFeed {
    pending: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a notification to the feed.
    pub fn push(&self, notification: Notification) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }

    /// Remove and return every notification still live at `now`.
    ///
    /// Expired notifications are dropped.
    #[must_use]
    pub fn take_live(&self, now: DateTime<Utc>) -> Vec<Notification> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *pending)
            .into_iter()
            .filter(|n| !n.is_expired(now))
            .collect()
    }
}

impl Notifier for NotificationFeed {
    fn notify(&self, notification: Notification) {
        self.push(notification);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_level_strings() {
        assert_eq!(NotificationLevel::Success.as_str(), "success");
        assert_eq!(NotificationLevel::Info.as_str(), "info");
        assert_eq!(NotificationLevel::Danger.as_str(), "danger");
    }

    #[test]
    fn test_expiry_after_three_seconds() {
        let n = Notification::info("Cart emptied");
        assert!(!n.is_expired(n.created_at));
        assert!(!n.is_expired(n.created_at + chrono::Duration::milliseconds(2_999)));
        assert!(n.is_expired(n.created_at + chrono::Duration::seconds(3)));
    }

    #[test]
    fn test_feed_take_live_drains() {
        let feed = NotificationFeed::new();
        feed.notify(Notification::success("Added"));
        feed.notify(Notification::danger("Failed"));

        let now = Utc::now();
        let live = feed.take_live(now);
        assert_eq!(live.len(), 2);
        assert_eq!(live[0].level, NotificationLevel::Success);
        assert!(feed.take_live(now).is_empty());
    }

    #[test]
    fn test_feed_drops_expired() {
        let feed = NotificationFeed::new();
        let mut old = Notification::info("Old");
        old.created_at = Utc::now() - chrono::Duration::seconds(10);
        feed.push(old);
        feed.push(Notification::info("New"));

        let live = feed.take_live(Utc::now());
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].message, "New");
    }

    #[test]
    fn test_feed_clones_share_buffer() {
        let feed = NotificationFeed::new();
        let handle = feed.clone();
        handle.notify(Notification::info("Shared"));
        assert_eq!(feed.take_live(Utc::now()).len(), 1);
    }
}
