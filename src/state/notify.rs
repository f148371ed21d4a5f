/// User-facing notifications (toasts)

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Warning,
    Error,
}

impl Level {
    /// How long a toast of this level stays up
    pub fn lifetime(self) -> Duration {
        match self {
            Level::Success => Duration::from_secs(4),
            Level::Warning => Duration::from_secs(5),
            Level::Error => Duration::from_secs(6),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub text: String,
    /// Notifications sharing a key replace each other instead of stacking
    pub key: Option<&'static str>,
}

impl Notification {
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(Level::Success, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(Level::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Level::Error, text)
    }

    fn new(level: Level, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            key: None,
        }
    }

    pub fn with_key(mut self, key: &'static str) -> Self {
        self.key = Some(key);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub notification: Notification,
    pub expires_at: Instant,
}

/// Live toasts, oldest first
#[derive(Debug, Default)]
pub struct Notifications {
    toasts: Vec<Toast>,
    next_id: u64,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: Notification, now: Instant) -> u64 {
        if let Some(key) = notification.key {
            self.toasts.retain(|t| t.notification.key != Some(key));
        }

        match notification.level {
            Level::Error => tracing::warn!(text = %notification.text, "notify"),
            _ => tracing::info!(text = %notification.text, "notify"),
        }

        self.next_id += 1;
        let expires_at = now + notification.level.lifetime();
        self.toasts.push(Toast {
            id: self.next_id,
            notification,
            expires_at,
        });
        self.next_id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.toasts.retain(|t| t.id != id);
    }

    /// Drop toasts whose lifetime has passed
    pub fn expire(&mut self, now: Instant) {
        self.toasts.retain(|t| t.expires_at > now);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    /// Most recent toast
    pub fn last(&self) -> Option<&Notification> {
        self.toasts.last().map(|t| &t.notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyed_notifications_replace_each_other() {
        let mut notifications = Notifications::new();
        let now = Instant::now();

        notifications.push(Notification::error("Please select a file first").with_key("no-file"), now);
        notifications.push(Notification::success("Uploaded"), now);
        notifications.push(Notification::error("Please select a file first").with_key("no-file"), now);

        assert_eq!(notifications.len(), 2);
        assert_eq!(notifications.last().unwrap().key, Some("no-file"));
    }

    #[test]
    fn test_expiry_follows_level_lifetime() {
        let mut notifications = Notifications::new();
        let now = Instant::now();

        notifications.push(Notification::success("ok"), now);
        notifications.push(Notification::error("bad"), now);

        notifications.expire(now + Duration::from_secs(5));
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications.last().unwrap().text, "bad");

        notifications.expire(now + Duration::from_secs(6));
        assert!(notifications.is_empty());
    }

    #[test]
    fn test_dismiss() {
        let mut notifications = Notifications::new();
        let id = notifications.push(Notification::warning("careful"), Instant::now());

        notifications.dismiss(id);
        assert!(notifications.is_empty());
    }
}
