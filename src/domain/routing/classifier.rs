//! Event classifier.
//!
//! Pure function from (event, subscription state, context) to a
//! [`RoutingDecision`]. Rules in priority order:
//!
//! ```text
//! first event on subscription  -> Suppressed
//! sender == local user         -> SelfAuthored
//! room == active room          -> ActiveRoomEvent
//! otherwise                    -> NotifyEvent
//! ```
//!
//! The backend replays the room's current value right after subscribing, so
//! the first callback is history, not a live message. The caller owns the
//! first-event flag and must set it right after classifying.

use super::decision::{RoutingContext, RoutingDecision};
use super::message::MessageEvent;

/// Classifies a message event.
///
/// `has_observed_first_event` is the subscription's flag as it was *before*
/// this event arrived.
pub fn classify(
    event: &MessageEvent,
    has_observed_first_event: bool,
    ctx: &RoutingContext,
) -> RoutingDecision {
    if !has_observed_first_event {
        return RoutingDecision::Suppressed;
    }
    if event.is_authored_by(&ctx.local_user_id) {
        return RoutingDecision::SelfAuthored;
    }
    if ctx.is_active_room(&event.room_id) {
        return RoutingDecision::ActiveRoomEvent;
    }
    RoutingDecision::NotifyEvent
}
