//! User-facing notifications
//!
//! The board reports outcomes through an injected [`Notifier`]. The TUI uses
//! [`ToastQueue`], which keeps short-lived toasts for the footer.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use ratatui::style::Color;

/// Maximum number of toasts to display at once
const MAX_VISIBLE_TOASTS: usize = 3;

/// Default auto-dismiss duration in seconds
const DEFAULT_DISMISS_SECONDS: u64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

impl NotificationLevel {
    pub fn color(&self) -> Color {
        match self {
            NotificationLevel::Success => Color::Green,
            NotificationLevel::Error => Color::Red,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            NotificationLevel::Success => "✓",
            NotificationLevel::Error => "✗",
        }
    }
}

/// Capability for surfacing transient messages to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotificationLevel, message: &str);

    fn success(&self, message: &str) {
        self.notify(NotificationLevel::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(NotificationLevel::Error, message);
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: Instant,
}

impl Toast {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

/// Toasts waiting to be drawn, oldest first.
#[derive(Debug)]
pub struct ToastQueue {
    toasts: Mutex<VecDeque<Toast>>,
    ttl: Duration,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_DISMISS_SECONDS))
    }
}

impl ToastQueue {
    pub fn new(ttl: Duration) -> Self {
        Self {
            toasts: Mutex::new(VecDeque::new()),
            ttl,
        }
    }

    /// Drop expired toasts and return the newest ones still showing.
    pub fn visible(&self) -> Vec<Toast> {
        let mut toasts = match self.toasts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        toasts.retain(|t| !t.is_expired(self.ttl));
        let skip = toasts.len().saturating_sub(MAX_VISIBLE_TOASTS);
        toasts.iter().skip(skip).cloned().collect()
    }

    pub fn dismiss_all(&self) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.clear();
        }
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, level: NotificationLevel, message: &str) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push_back(Toast {
                level,
                message: message.to_string(),
                created_at: Instant::now(),
            });
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Keeps every notification for later inspection.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingNotifier {
        pub(crate) seen: Mutex<Vec<(NotificationLevel, String)>>,
    }

    impl RecordingNotifier {
        pub(crate) fn errors(&self) -> Vec<String> {
            self.of_level(NotificationLevel::Error)
        }

        pub(crate) fn successes(&self) -> Vec<String> {
            self.of_level(NotificationLevel::Success)
        }

        fn of_level(&self, level: NotificationLevel) -> Vec<String> {
            self.seen
                .lock()
                .unwrap()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, m)| m.clone())
                .collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, level: NotificationLevel, message: &str) {
            self.seen.lock().unwrap().push((level, message.to_string()));
        }
    }
}
