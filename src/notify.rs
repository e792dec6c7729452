use std::time::{Duration, Instant};

use serde::Serialize;

/// How long a notification stays visible.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    #[serde(skip)]
    pub expires_at: Instant,
}

/// User-visible messages that expire on their own.
#[derive(Debug, Clone)]
pub struct Notifications {
    ttl: Duration,
    items: Vec<Notification>,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(NOTIFICATION_TTL)
    }
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.push_at(level, message, Instant::now());
    }

    pub fn push_at(&mut self, level: NotificationLevel, message: impl Into<String>, now: Instant) {
        let message = message.into();
        match level {
            NotificationLevel::Error => tracing::warn!(%message, "notification"),
            _ => tracing::info!(%message, "notification"),
        }
        self.items.push(Notification {
            level,
            message,
            expires_at: now + self.ttl,
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Error, message);
    }

    /// Drops expired notifications and returns the rest, oldest first.
    pub fn active_at(&mut self, now: Instant) -> &[Notification] {
        self.items.retain(|n| n.expires_at > now);
        &self.items
    }

    pub fn active(&mut self) -> &[Notification] {
        self.active_at(Instant::now())
    }

    /// Every notification still held, expired or not.
    pub fn all(&self) -> &[Notification] {
        &self.items
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.items)
    }

    pub fn has_errors(&self) -> bool {
        self.items
            .iter()
            .any(|n| n.level == NotificationLevel::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifications_expire_after_ttl() {
        let start = Instant::now();
        let mut notes = Notifications::default();
        notes.push_at(NotificationLevel::Success, "Acara berhasil ditambahkan!", start);
        notes.push_at(
            NotificationLevel::Error,
            "Gagal memuat data keluarga. Silakan coba lagi.",
            start + Duration::from_secs(3),
        );

        assert_eq!(notes.active_at(start + Duration::from_secs(4)).len(), 2);
        let left = notes.active_at(start + Duration::from_secs(5));
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].level, NotificationLevel::Error);
        assert!(notes.active_at(start + Duration::from_secs(9)).is_empty());
        assert!(!notes.has_errors());
    }
}
