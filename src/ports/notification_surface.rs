//! NotificationSurface port - Where notify-worthy messages are shown.

use crate::domain::notification::ToastNotification;

/// Presentation layer for message toasts.
///
/// Fire-and-forget: the router neither waits for nor inspects the outcome.
/// Deduplication and rate limiting, if any, belong to the implementation.
pub trait NotificationSurface: Send + Sync {
    fn present(&self, toast: ToastNotification);
}
