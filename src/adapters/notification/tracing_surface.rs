//! Notification surface that writes toasts to the log.
//!
//! Useful for headless clients and smoke runs where no UI is attached.

use crate::domain::notification::ToastNotification;
use crate::ports::NotificationSurface;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotificationSurface;

impl TracingNotificationSurface {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationSurface for TracingNotificationSurface {
    fn present(&self, toast: ToastNotification) {
        // Message text stays out of the log.
        tracing::info!(
            room_id = %toast.room_id,
            sender_id = %toast.sender_id,
            sender_name = toast.sender_name.as_deref().unwrap_or(""),
            sent_at = toast.sent_at.as_unix_secs(),
            "New message notification"
        );
    }
}
