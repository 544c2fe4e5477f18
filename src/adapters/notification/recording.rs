//! Recording notification surface for testing.
//!
//! # Security Note
//!
//! Test-only: uses `.expect()` on lock operations.

use std::sync::RwLock;

use crate::domain::notification::ToastNotification;
use crate::ports::NotificationSurface;

/// Captures every presented toast for assertions.
#[derive(Default)]
pub struct RecordingNotificationSurface {
    presented: RwLock<Vec<ToastNotification>>,
}

impl RecordingNotificationSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all presented toasts, oldest first.
    pub fn presented(&self) -> Vec<ToastNotification> {
        self.presented
            .read()
            .expect("RecordingNotificationSurface: lock poisoned")
            .clone()
    }

    pub fn presented_count(&self) -> usize {
        self.presented
            .read()
            .expect("RecordingNotificationSurface: lock poisoned")
            .len()
    }

    /// Clears captured toasts (for test isolation).
    pub fn clear(&self) {
        self.presented
            .write()
            .expect("RecordingNotificationSurface: write lock poisoned")
            .clear();
    }
}

impl NotificationSurface for RecordingNotificationSurface {
    fn present(&self, toast: ToastNotification) {
        self.presented
            .write()
            .expect("RecordingNotificationSurface: write lock poisoned")
            .push(toast);
    }
}
