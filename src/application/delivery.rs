//! Per-subscription delivery: backend callback -> classifier -> router.
//!
//! # Event Flow
//!
//! ```text
//! RoomBackend delivers Option<MessageEvent>
//!          │
//!          ▼
//! ┌──────────────────────┐
//! │ SubscriptionDelivery │  waits for the previous delivery of this room
//! │  flips first-event   │
//! └──────────────────────┘
//!          │
//!          ▼
//! ┌──────────────────────┐
//! │      classify()      │  RoutingContext from SessionContext
//! └──────────────────────┘
//!          │
//!          ▼
//! ┌──────────────────────┐
//! │ NotificationRouter   │
//! └──────────────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{RoomId, UserId};
use crate::domain::routing::{classify, MessageEvent, RoutingContext};
use crate::domain::subscription::SubscriptionState;
use crate::ports::RoomEventSink;

use super::router::NotificationRouter;

/// Session-scoped facts the classifier reads on every delivery.
pub struct SessionContext {
    local_user_id: UserId,
    active_room: RwLock<Option<RoomId>>,
}

impl SessionContext {
    pub fn new(local_user_id: UserId) -> Self {
        Self {
            local_user_id,
            active_room: RwLock::new(None),
        }
    }

    pub fn local_user_id(&self) -> &UserId {
        &self.local_user_id
    }

    pub async fn active_room(&self) -> Option<RoomId> {
        self.active_room.read().await.clone()
    }

    /// Sets (or clears) the room open in the UI.
    pub async fn set_active_room(&self, room_id: Option<RoomId>) {
        *self.active_room.write().await = room_id;
    }

    /// Snapshot of the context for one classification.
    pub async fn routing_context(&self) -> RoutingContext {
        RoutingContext::new(self.local_user_id.clone(), self.active_room().await)
    }
}

/// Everything a subscription needs to classify and route its messages.
#[derive(Clone)]
pub struct DeliveryPipeline {
    context: Arc<SessionContext>,
    router: Arc<NotificationRouter>,
}

impl DeliveryPipeline {
    pub fn new(context: Arc<SessionContext>, router: Arc<NotificationRouter>) -> Self {
        Self { context, router }
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    /// Creates the backend callback for one subscription.
    pub fn sink_for(&self, state: Arc<SubscriptionState>) -> Arc<dyn RoomEventSink> {
        Arc::new(SubscriptionDelivery {
            state,
            pipeline: self.clone(),
        })
    }
}

/// Backend callback bound to a single room subscription.
pub struct SubscriptionDelivery {
    state: Arc<SubscriptionState>,
    pipeline: DeliveryPipeline,
}

#[async_trait]
impl RoomEventSink for SubscriptionDelivery {
    async fn deliver(&self, message: Option<MessageEvent>) {
        let room_id = self.state.room_id();

        if let Some(event) = &message {
            if !event.belongs_to(room_id) {
                tracing::warn!(
                    room_id = %room_id,
                    event_room_id = %event.room_id,
                    "Backend delivered a message for another room, dropping"
                );
                return;
            }
        }

        // Held until routing finishes so the next delivery of this room waits.
        let mut guard = self.state.begin_delivery().await;

        if self.state.is_released() {
            tracing::debug!(room_id = %room_id, "Delivery after release, dropping");
            return;
        }

        let observed = guard.mark_observed();

        let Some(event) = message else {
            tracing::debug!(room_id = %room_id, "Room has no message yet");
            return;
        };

        let ctx = self.pipeline.context.routing_context().await;
        let decision = classify(&event, observed, &ctx);

        tracing::debug!(
            room_id = %room_id,
            sender_id = %event.sender_id,
            sent_at = event.timestamp.as_unix_secs(),
            decision = %decision,
            "Classified room message"
        );

        self.pipeline.router.route(decision, event);
    }

    fn name(&self) -> &'static str {
        "SubscriptionDelivery"
    }
}
