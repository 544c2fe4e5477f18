//! RoomBackend port - Interface to the real-time message backend.
//!
//! The backend turns a room id into a live subscription that streams the
//! room's messages to a sink until the handle is given back.
//!
//! ## Delivery contract
//!
//! - Right after subscribing, the backend delivers the room's current value
//!   once (`None` when the room has no message yet). Live messages follow.
//! - Deliveries for one subscription are sequential: the backend awaits
//!   `deliver` before delivering the next message of that room.
//! - Deliveries for different rooms may run concurrently.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::RoomId;
use crate::domain::routing::MessageEvent;
use crate::domain::subscription::{BackendError, SubscriptionHandle};

/// Callback registered with the backend for a single subscription.
#[async_trait]
pub trait RoomEventSink: Send + Sync {
    /// Receives the next value of the room.
    async fn deliver(&self, message: Option<MessageEvent>);

    /// Sink name for logging.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to room message streams.
///
/// # Example
///
/// ```ignore
/// let handle = backend.subscribe(&room_id, sink).await?;
/// // ... messages flow into `sink` ...
/// backend.unsubscribe(handle).await?;
/// ```
#[async_trait]
pub trait RoomBackend: Send + Sync {
    /// Starts streaming `room_id` into `sink`.
    async fn subscribe(
        &self,
        room_id: &RoomId,
        sink: Arc<dyn RoomEventSink>,
    ) -> Result<SubscriptionHandle, BackendError>;

    /// Stops the subscription identified by `handle`.
    async fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<(), BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that traits are object-safe
    #[allow(dead_code)]
    fn assert_backend_object_safe(_: &dyn RoomBackend) {}

    #[allow(dead_code)]
    fn assert_sink_object_safe(_: &dyn RoomEventSink) {}

    #[allow(dead_code)]
    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn room_backend_is_send_sync() {
        #[allow(dead_code)]
        fn check<T: RoomBackend>() {
            assert_send_sync::<T>();
        }
    }
}
