//! Routing context and routing decisions.

use serde::Serialize;
use std::fmt;

use crate::domain::foundation::{RoomId, UserId};

/// Ambient facts the classifier needs besides the event itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingContext {
    /// The user this session belongs to.
    pub local_user_id: UserId,

    /// The room currently open in the UI, if any.
    pub active_room_id: Option<RoomId>,
}

impl RoutingContext {
    pub fn new(local_user_id: UserId, active_room_id: Option<RoomId>) -> Self {
        Self {
            local_user_id,
            active_room_id,
        }
    }

    /// Returns true if `room_id` is the room open in the UI.
    pub fn is_active_room(&self, room_id: &RoomId) -> bool {
        self.active_room_id.as_ref() == Some(room_id)
    }
}

/// Outcome of classifying one message event.
///
/// Variants are mutually exclusive and listed in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingDecision {
    /// First event on a fresh subscription: a replay of existing state.
    Suppressed,

    /// Sent by the local user.
    SelfAuthored,

    /// Belongs to the room currently open in the UI.
    ActiveRoomEvent,

    /// Anything else; worth a user-visible notification.
    NotifyEvent,
}

impl RoutingDecision {
    /// Returns true if the router drops this decision without side effects.
    pub fn is_dropped(&self) -> bool {
        matches!(self, RoutingDecision::Suppressed | RoutingDecision::SelfAuthored)
    }
}

impl fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoutingDecision::Suppressed => "suppressed",
            RoutingDecision::SelfAuthored => "self_authored",
            RoutingDecision::ActiveRoomEvent => "active_room_event",
            RoutingDecision::NotifyEvent => "notify_event",
        };
        write!(f, "{}", s)
    }
}
