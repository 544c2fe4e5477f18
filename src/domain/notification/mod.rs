//! Notification module - user-visible payloads derived from routed messages.

mod toast;

pub use toast::{ToastNotification, ToastPosition, ToastStyle};
