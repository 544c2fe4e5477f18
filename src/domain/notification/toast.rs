//! Toast notification built from a notify-worthy message.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::foundation::{RoomId, Timestamp, UserId};
use crate::domain::routing::MessageEvent;

/// Where a toast is shown on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastPosition {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// Presentation settings applied to every message toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastStyle {
    pub close_button_text: String,
    pub duration: Duration,
    pub css_class: String,
    pub position: ToastPosition,
}

impl Default for ToastStyle {
    fn default() -> Self {
        Self {
            close_button_text: "Close".to_string(),
            duration: Duration::from_millis(100_000),
            css_class: "new-chat-message".to_string(),
            position: ToastPosition::Top,
        }
    }
}

/// Payload handed to the notification surface for a message arriving in a
/// room the user is not looking at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToastNotification {
    pub room_id: RoomId,
    pub sender_id: UserId,
    pub sent_at: Timestamp,
    pub message: String,
    pub sender_name: Option<String>,
    pub photo_url: Option<String>,
    pub close_button_text: String,
    pub show_close_button: bool,
    pub duration: Duration,
    pub css_class: String,
    pub position: ToastPosition,
}

impl ToastNotification {
    /// Builds a toast from a message event.
    ///
    /// The text comes from `payload.message`, or from the payload itself when
    /// the backend delivers a bare string.
    pub fn from_event(event: &MessageEvent, style: &ToastStyle) -> Self {
        let payload = &event.payload;
        let message = payload
            .get("message")
            .and_then(|v| v.as_str())
            .or_else(|| payload.as_str())
            .unwrap_or_default()
            .to_string();

        Self {
            room_id: event.room_id.clone(),
            sender_id: event.sender_id.clone(),
            sent_at: event.timestamp,
            message,
            sender_name: string_field(payload, "name"),
            photo_url: string_field(payload, "photoUrl"),
            close_button_text: style.close_button_text.clone(),
            show_close_button: true,
            duration: style.duration,
            css_class: style.css_class.clone(),
            position: style.position,
        }
    }
}

fn string_field(payload: &serde_json::Value, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
