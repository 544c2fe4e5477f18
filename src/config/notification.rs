//! Notification presentation configuration

use serde::Deserialize;
use std::time::Duration;

use crate::domain::notification::{ToastPosition, ToastStyle};

use super::error::ValidationError;

/// Defaults applied to every message toast
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Close button label (overridden by the `CLOSE` text when localized)
    #[serde(default = "default_close_button_text")]
    pub close_button_text: String,

    /// How long a toast stays visible, in milliseconds
    #[serde(default = "default_duration")]
    pub duration_ms: u64,

    /// CSS class marking message toasts
    #[serde(default = "default_css_class")]
    pub css_class: String,

    #[serde(default)]
    pub position: ToastPosition,
}

impl NotificationConfig {
    pub fn toast_style(&self) -> ToastStyle {
        ToastStyle {
            close_button_text: self.close_button_text.clone(),
            duration: Duration::from_millis(self.duration_ms),
            css_class: self.css_class.clone(),
            position: self.position,
        }
    }

    /// Validate notification configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.close_button_text.trim().is_empty() {
            return Err(ValidationError::MissingRequired("NOTIFICATION__CLOSE_BUTTON_TEXT"));
        }
        if self.duration_ms == 0 {
            return Err(ValidationError::InvalidNotificationDuration);
        }
        Ok(())
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            close_button_text: default_close_button_text(),
            duration_ms: default_duration(),
            css_class: default_css_class(),
            position: ToastPosition::default(),
        }
    }
}

fn default_close_button_text() -> String {
    "Close".to_string()
}

fn default_duration() -> u64 {
    100_000
}

fn default_css_class() -> String {
    "new-chat-message".to_string()
}
