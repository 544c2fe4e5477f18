//! Notification router.
//!
//! Dispatches classified messages to exactly one sink:
//!
//! ```text
//! Suppressed / SelfAuthored  ->  dropped
//! ActiveRoomEvent            ->  CurrentRoomStream (open conversation view)
//! NotifyEvent                ->  NotificationSurface (toast)
//! ```
//!
//! Routing never blocks and never fails: the current-room queue is
//! unbounded and the notification surface is fire-and-forget.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::notification::{ToastNotification, ToastStyle};
use crate::domain::routing::{MessageEvent, RoutingDecision};
use crate::ports::NotificationSurface;

/// Receiving end of the current-room message queue.
///
/// Single consumer; messages arrive in the order they were routed.
pub struct CurrentRoomStream {
    rx: mpsc::UnboundedReceiver<MessageEvent>,
}

impl CurrentRoomStream {
    /// Waits for the next message. Returns `None` once the router is gone.
    pub async fn recv(&mut self) -> Option<MessageEvent> {
        self.rx.recv().await
    }

    /// Returns the next queued message without waiting.
    pub fn try_recv(&mut self) -> Option<MessageEvent> {
        self.rx.try_recv().ok()
    }

    /// Takes every message queued so far.
    pub fn drain(&mut self) -> Vec<MessageEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            drained.push(event);
        }
        drained
    }
}

/// Routes classified messages to the current-room stream or the
/// notification surface.
pub struct NotificationRouter {
    current_room: mpsc::UnboundedSender<MessageEvent>,
    surface: Arc<dyn NotificationSurface>,
    style: ToastStyle,
}

impl NotificationRouter {
    /// Creates a router and the stream the active conversation view drains.
    pub fn new(
        surface: Arc<dyn NotificationSurface>,
        style: ToastStyle,
    ) -> (Self, CurrentRoomStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        let router = Self {
            current_room: tx,
            surface,
            style,
        };
        (router, CurrentRoomStream { rx })
    }

    pub fn style(&self) -> &ToastStyle {
        &self.style
    }

    /// Dispatches one classified message.
    pub fn route(&self, decision: RoutingDecision, event: MessageEvent) {
        match decision {
            RoutingDecision::Suppressed | RoutingDecision::SelfAuthored => {}
            RoutingDecision::ActiveRoomEvent => {
                if let Err(mpsc::error::SendError(event)) = self.current_room.send(event) {
                    tracing::debug!(
                        room_id = %event.room_id,
                        "Current room stream closed, dropping message"
                    );
                }
            }
            RoutingDecision::NotifyEvent => {
                self.surface
                    .present(ToastNotification::from_event(&event, &self.style));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::RecordingNotificationSurface;
    use crate::domain::foundation::{RoomId, Timestamp, UserId};
    use serde_json::json;

    fn event(room: u64, ts: u64) -> MessageEvent {
        MessageEvent::new(
            RoomId::from(room),
            UserId::new("u9").unwrap(),
            json!({"message": format!("m{}", ts)}),
            Timestamp::from_unix_secs(ts),
        )
    }

    fn router() -> (NotificationRouter, CurrentRoomStream, Arc<RecordingNotificationSurface>) {
        let surface = Arc::new(RecordingNotificationSurface::new());
        let (router, stream) = NotificationRouter::new(surface.clone(), ToastStyle::default());
        (router, stream, surface)
    }

    #[test]
    fn dropped_decisions_have_no_effect() {
        let (router, mut stream, surface) = router();

        router.route(RoutingDecision::Suppressed, event(101, 1));
        router.route(RoutingDecision::SelfAuthored, event(101, 2));

        assert!(stream.try_recv().is_none());
        assert_eq!(surface.presented_count(), 0);
    }

    #[test]
    fn active_room_events_go_to_stream_in_order() {
        let (router, mut stream, surface) = router();

        router.route(RoutingDecision::ActiveRoomEvent, event(101, 1));
        router.route(RoutingDecision::ActiveRoomEvent, event(101, 2));
        router.route(RoutingDecision::ActiveRoomEvent, event(101, 3));

        let stamps: Vec<u64> = stream
            .drain()
            .iter()
            .map(|e| e.timestamp.as_unix_secs())
            .collect();
        assert_eq!(stamps, vec![1, 2, 3]);
        assert_eq!(surface.presented_count(), 0);
    }

    #[test]
    fn notify_events_become_toasts() {
        let (router, mut stream, surface) = router();

        router.route(RoutingDecision::NotifyEvent, event(102, 4));

        assert!(stream.try_recv().is_none());
        let presented = surface.presented();
        assert_eq!(presented.len(), 1);
        assert_eq!(presented[0].room_id, RoomId::from(102));
        assert_eq!(presented[0].message, "m4");
    }

    #[test]
    fn routing_after_stream_dropped_does_not_panic() {
        let (router, stream, _surface) = router();
        drop(stream);

        router.route(RoutingDecision::ActiveRoomEvent, event(101, 1));
    }

    #[tokio::test]
    async fn stream_ends_when_router_dropped() {
        let (router, mut stream, _surface) = router();
        router.route(RoutingDecision::ActiveRoomEvent, event(101, 1));
        drop(router);

        assert!(stream.recv().await.is_some());
        assert!(stream.recv().await.is_none());
    }
}
