//! Room subscription entries and their per-subscription delivery state.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::domain::foundation::RoomId;

/// Opaque token returned by the backend for a live subscription.
///
/// Not `Clone`: the registry entry is its only owner and gives
/// it back to the backend exactly once on release.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(String);

impl SubscriptionHandle {
    /// Wraps a backend-issued token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Creates a handle with a random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State shared between a registry entry and its delivery callback.
///
/// The first-event flag sits behind an async mutex that the delivery path
/// holds across classify and route, so two deliveries for the same room can
/// never both observe the flag as unset and are routed in lock order.
#[derive(Debug)]
pub struct SubscriptionState {
    room_id: RoomId,
    observed_first_event: Mutex<bool>,
    released: AtomicBool,
}

impl SubscriptionState {
    pub fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            observed_first_event: Mutex::new(false),
            released: AtomicBool::new(false),
        }
    }

    pub fn new_shared(room_id: RoomId) -> Arc<Self> {
        Arc::new(Self::new(room_id))
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Starts processing one delivered event.
    ///
    /// Waits for the previous delivery on this subscription to finish.
    pub async fn begin_delivery(&self) -> DeliveryGuard<'_> {
        DeliveryGuard {
            observed: self.observed_first_event.lock().await,
        }
    }

    pub async fn has_observed_first_event(&self) -> bool {
        *self.observed_first_event.lock().await
    }

    /// Marks the subscription as released; later deliveries are ignored.
    pub fn release(&self) {
        self.released.store(true, Ordering::Release);
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

/// Exclusive access to a subscription's first-event flag for one delivery.
pub struct DeliveryGuard<'a> {
    observed: MutexGuard<'a, bool>,
}

impl DeliveryGuard<'_> {
    /// Sets the first-event flag and returns its previous value.
    pub fn mark_observed(&mut self) -> bool {
        std::mem::replace(&mut *self.observed, true)
    }
}

/// A live backend subscription for one room, owned by the registry.
#[derive(Debug)]
pub struct RoomSubscription {
    handle: SubscriptionHandle,
    state: Arc<SubscriptionState>,
}

impl RoomSubscription {
    pub fn new(handle: SubscriptionHandle, state: Arc<SubscriptionState>) -> Self {
        Self { handle, state }
    }

    pub fn room_id(&self) -> &RoomId {
        self.state.room_id()
    }

    pub fn handle(&self) -> &SubscriptionHandle {
        &self.handle
    }

    pub fn state(&self) -> &Arc<SubscriptionState> {
        &self.state
    }

    /// Stops delivery and hands the backend handle back for release.
    pub fn into_handle(self) -> SubscriptionHandle {
        self.state.release();
        self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_state_has_not_observed_first_event() {
        let state = SubscriptionState::new(RoomId::from(101));
        assert!(!state.has_observed_first_event().await);
        assert!(!state.is_released());
    }

    #[tokio::test]
    async fn mark_observed_flips_exactly_once() {
        let state = SubscriptionState::new(RoomId::from(101));

        let first = state.begin_delivery().await.mark_observed();
        let second = state.begin_delivery().await.mark_observed();

        assert!(!first);
        assert!(second);
        assert!(state.has_observed_first_event().await);
    }

    #[tokio::test]
    async fn into_handle_releases_state() {
        let state = SubscriptionState::new_shared(RoomId::from(101));
        let sub = RoomSubscription::new(SubscriptionHandle::new("h-1"), state.clone());

        let handle = sub.into_handle();

        assert_eq!(handle.as_str(), "h-1");
        assert!(state.is_released());
    }

    #[test]
    fn generated_handles_are_unique() {
        assert_ne!(SubscriptionHandle::generate(), SubscriptionHandle::generate());
    }
}
