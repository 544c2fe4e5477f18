//! Message events delivered by the room backend.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{RoomId, Timestamp, UserId};

/// A single message observed on a room subscription.
///
/// The payload is owned by the backend and stays opaque to the router; only
/// the notification layer peeks into it to build a toast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub room_id: RoomId,
    pub sender_id: UserId,
    pub payload: serde_json::Value,
    pub timestamp: Timestamp,
}

impl MessageEvent {
    pub fn new(
        room_id: RoomId,
        sender_id: UserId,
        payload: serde_json::Value,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            room_id,
            sender_id,
            payload,
            timestamp,
        }
    }

    /// Returns true if this message was sent by `user_id`.
    pub fn is_authored_by(&self, user_id: &UserId) -> bool {
        &self.sender_id == user_id
    }

    /// Returns true if this message belongs to `room_id`.
    pub fn belongs_to(&self, room_id: &RoomId) -> bool {
        &self.room_id == room_id
    }
}
