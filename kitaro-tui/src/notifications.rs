//! Notification system for the TUI.

use chrono::{DateTime, Utc};
use kitaro_core::NotifyLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
    Success,
}

impl From<NotifyLevel> for NotificationLevel {
    fn from(level: NotifyLevel) -> Self {
        match level {
            NotifyLevel::Info => NotificationLevel::Info,
            NotifyLevel::Success => NotificationLevel::Success,
            NotifyLevel::Error => NotificationLevel::Error,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}
