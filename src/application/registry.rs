//! Subscription registry: the set of rooms this session listens to.
//!
//! # Invariants
//!
//! - At most one live subscription per room; attaching a tracked room is a
//!   no-op.
//! - The registry lock is never held across a backend call. Backend handles
//!   are acquired first and registered afterwards; released entries are
//!   removed first and released afterwards.
//! - A detached room is removed locally even if the backend release fails.
//!
//! ```text
//! resync({A, C}) with {A, B} tracked:
//!
//!   tracked  A  B           desired  A  C
//!            │  └── detach           │  └── attach (fresh, first event suppressed)
//!            └───── untouched (flag and handle kept)
//! ```

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Mutex;

use crate::config::RegistryConfig;
use crate::domain::foundation::RoomId;
use crate::domain::subscription::{
    AttachError, DetachError, ResyncError, ResyncFailure, RoomSubscription, SubscriptionHandle,
    SubscriptionState,
};
use crate::ports::{RoomBackend, RoomEventSink};

use super::delivery::DeliveryPipeline;

/// Owns the active room subscriptions of one session.
pub struct SubscriptionRegistry {
    backend: Arc<dyn RoomBackend>,
    pipeline: DeliveryPipeline,
    entries: Mutex<HashMap<RoomId, RoomSubscription>>,
    attach_timeout: Duration,
    detach_timeout: Duration,
}

impl SubscriptionRegistry {
    pub fn new(
        backend: Arc<dyn RoomBackend>,
        pipeline: DeliveryPipeline,
        config: &RegistryConfig,
    ) -> Self {
        Self {
            backend,
            pipeline,
            entries: Mutex::new(HashMap::new()),
            attach_timeout: config.attach_timeout(),
            detach_timeout: config.detach_timeout(),
        }
    }

    /// Subscribes to `room_id` unless it is already tracked.
    ///
    /// Safe to call speculatively whenever a room membership is discovered.
    ///
    /// # Errors
    ///
    /// Returns `AttachError` if the backend refuses or does not answer in
    /// time. Nothing is registered in that case.
    pub async fn attach(&self, room_id: &RoomId) -> Result<(), AttachError> {
        if self.entries.lock().await.contains_key(room_id) {
            tracing::debug!(room_id = %room_id, "Room already subscribed");
            return Ok(());
        }

        let state = SubscriptionState::new_shared(room_id.clone());
        let sink = self.pipeline.sink_for(state.clone());

        let handle = match self.subscribe(room_id, sink).await {
            Ok(handle) => handle,
            Err(e) => {
                // The backend may still hold the sink after a failure or timeout.
                state.release();
                tracing::warn!(room_id = %room_id, error = %e, "Room subscribe failed");
                return Err(e);
            }
        };

        let duplicate = {
            let mut entries = self.entries.lock().await;
            match entries.entry(room_id.clone()) {
                Entry::Occupied(_) => {
                    state.release();
                    Some(RoomSubscription::new(handle, state))
                }
                Entry::Vacant(slot) => {
                    slot.insert(RoomSubscription::new(handle, state));
                    None
                }
            }
        };

        // A concurrent attach for the same room registered first.
        if let Some(duplicate) = duplicate {
            tracing::debug!(room_id = %room_id, "Lost attach race, releasing duplicate subscription");
            if let Err(e) = self.release(duplicate).await {
                tracing::warn!(
                    room_id = %room_id,
                    error = %e,
                    "Failed to release duplicate subscription, backend subscription leaked"
                );
            }
            return Ok(());
        }

        tracing::info!(room_id = %room_id, "Subscribed to room");
        Ok(())
    }

    /// Unsubscribes from `room_id`. No-op if the room is not tracked.
    ///
    /// # Errors
    ///
    /// Returns `DetachError` if the backend release fails. The entry is
    /// removed regardless.
    pub async fn detach(&self, room_id: &RoomId) -> Result<(), DetachError> {
        let Some(subscription) = self.entries.lock().await.remove(room_id) else {
            tracing::debug!(room_id = %room_id, "Room not subscribed, nothing to detach");
            return Ok(());
        };

        self.release_logged(subscription).await
    }

    /// Reconciles the tracked rooms with `desired`.
    ///
    /// Detaches every tracked room not in `desired`, then attaches every
    /// desired room not yet tracked. Rooms in both sets keep their
    /// subscription untouched. Every step is attempted.
    ///
    /// # Errors
    ///
    /// Returns a `ResyncError` listing every failed attach and detach.
    pub async fn resync<I>(&self, desired: I) -> Result<(), ResyncError>
    where
        I: IntoIterator<Item = RoomId>,
    {
        let desired: HashSet<RoomId> = desired.into_iter().collect();

        let stale: Vec<RoomSubscription> = {
            let mut entries = self.entries.lock().await;
            let stale_ids: Vec<RoomId> = entries
                .keys()
                .filter(|id| !desired.contains(*id))
                .cloned()
                .collect();
            stale_ids
                .iter()
                .filter_map(|id| entries.remove(id))
                .collect()
        };
        let detached = stale.len();

        let mut failures: Vec<ResyncFailure> = join_all(
            stale
                .into_iter()
                .map(|subscription| self.release_logged(subscription)),
        )
        .await
        .into_iter()
        .filter_map(|result| result.err().map(ResyncFailure::from))
        .collect();

        let mut missing: Vec<RoomId> = {
            let entries = self.entries.lock().await;
            desired
                .iter()
                .filter(|id| !entries.contains_key(*id))
                .cloned()
                .collect()
        };
        missing.sort();
        let attached = missing.len();

        failures.extend(
            join_all(missing.iter().map(|room_id| self.attach(room_id)))
                .await
                .into_iter()
                .filter_map(|result| result.err().map(ResyncFailure::from)),
        );

        tracing::info!(
            desired = desired.len(),
            detached,
            attached,
            failures = failures.len(),
            "Resynced room subscriptions"
        );

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ResyncError::new(failures))
        }
    }

    /// Detaches every tracked room.
    pub async fn detach_all(&self) -> Result<(), ResyncError> {
        self.resync(std::iter::empty()).await
    }

    pub async fn contains(&self, room_id: &RoomId) -> bool {
        self.entries.lock().await.contains_key(room_id)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Tracked rooms, sorted.
    pub async fn rooms(&self) -> Vec<RoomId> {
        let mut rooms: Vec<RoomId> = self.entries.lock().await.keys().cloned().collect();
        rooms.sort();
        rooms
    }

    /// First-event flag of a tracked room, `None` if the room is not tracked.
    pub async fn has_observed_first_event(&self, room_id: &RoomId) -> Option<bool> {
        let state = {
            let entries = self.entries.lock().await;
            entries.get(room_id).map(|s| s.state().clone())
        };
        match state {
            Some(state) => Some(state.has_observed_first_event().await),
            None => None,
        }
    }

    /// Returns true if the registry lock is free and no room is tracked.
    ///
    /// Non-blocking; used where awaiting is impossible (drop paths).
    pub(crate) fn try_is_empty(&self) -> Option<bool> {
        self.entries.try_lock().ok().map(|entries| entries.is_empty())
    }

    async fn subscribe(
        &self,
        room_id: &RoomId,
        sink: Arc<dyn RoomEventSink>,
    ) -> Result<SubscriptionHandle, AttachError> {
        match tokio::time::timeout(self.attach_timeout, self.backend.subscribe(room_id, sink)).await {
            Ok(Ok(handle)) => Ok(handle),
            Ok(Err(source)) => Err(AttachError::Backend {
                room_id: room_id.clone(),
                source,
            }),
            Err(_) => Err(AttachError::Timeout {
                room_id: room_id.clone(),
                timeout: self.attach_timeout,
            }),
        }
    }

    async fn release(&self, subscription: RoomSubscription) -> Result<(), DetachError> {
        let room_id = subscription.room_id().clone();
        let handle = subscription.into_handle();

        match tokio::time::timeout(self.detach_timeout, self.backend.unsubscribe(handle)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(DetachError::Backend { room_id, source }),
            Err(_) => Err(DetachError::Timeout {
                room_id,
                timeout: self.detach_timeout,
            }),
        }
    }

    async fn release_logged(&self, subscription: RoomSubscription) -> Result<(), DetachError> {
        let room_id = subscription.room_id().clone();
        match self.release(subscription).await {
            Ok(()) => {
                tracing::info!(room_id = %room_id, "Unsubscribed from room");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    room_id = %room_id,
                    error = %e,
                    "Room unsubscribe failed, backend subscription may have leaked"
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryRoomBackend, RecordingNotificationSurface};
    use crate::application::delivery::SessionContext;
    use crate::application::router::NotificationRouter;
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::domain::notification::ToastStyle;
    use crate::domain::routing::MessageEvent;
    use crate::domain::subscription::BackendError;
    use serde_json::json;

    fn registry_with(
        backend: Arc<InMemoryRoomBackend>,
        config: RegistryConfig,
    ) -> (SubscriptionRegistry, Arc<RecordingNotificationSurface>) {
        let surface = Arc::new(RecordingNotificationSurface::new());
        let (router, _stream) = NotificationRouter::new(surface.clone(), ToastStyle::default());
        let context = Arc::new(SessionContext::new(UserId::new("u1").unwrap()));
        let pipeline = DeliveryPipeline::new(context, Arc::new(router));
        (SubscriptionRegistry::new(backend, pipeline, &config), surface)
    }

    fn registry(backend: Arc<InMemoryRoomBackend>) -> SubscriptionRegistry {
        registry_with(backend, RegistryConfig::default()).0
    }

    fn room(idx: u64) -> RoomId {
        RoomId::from(idx)
    }

    fn event(idx: u64, ts: u64) -> MessageEvent {
        MessageEvent::new(
            room(idx),
            UserId::new("u9").unwrap(),
            json!({"message": "hi"}),
            Timestamp::from_unix_secs(ts),
        )
    }

    #[tokio::test]
    async fn attach_twice_subscribes_once() {
        let backend = Arc::new(InMemoryRoomBackend::new());
        let registry = registry(backend.clone());

        registry.attach(&room(101)).await.unwrap();
        registry.attach(&room(101)).await.unwrap();

        assert_eq!(backend.subscribe_count(&room(101)), 1);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn attach_starts_with_unobserved_first_event() {
        let backend = Arc::new(InMemoryRoomBackend::new().without_replay());
        let registry = registry(backend);

        registry.attach(&room(101)).await.unwrap();

        assert_eq!(registry.has_observed_first_event(&room(101)).await, Some(false));
        assert_eq!(registry.has_observed_first_event(&room(999)).await, None);
    }

    #[tokio::test]
    async fn snapshot_replay_on_attach_is_suppressed() {
        let backend = Arc::new(InMemoryRoomBackend::new());
        backend.seed_message(event(102, 1));
        let (registry, surface) = registry_with(backend.clone(), RegistryConfig::default());

        registry.attach(&room(102)).await.unwrap();
        assert_eq!(registry.has_observed_first_event(&room(102)).await, Some(true));
        assert_eq!(surface.presented_count(), 0);

        backend.publish(event(102, 2)).await;
        assert_eq!(surface.presented_count(), 1);
    }

    #[tokio::test]
    async fn attach_failure_is_propagated_and_not_registered() {
        let backend = Arc::new(InMemoryRoomBackend::new());
        backend.fail_subscribe(&room(101), BackendError::PermissionDenied("private".into()));
        let registry = registry(backend.clone());

        let err = registry.attach(&room(101)).await.unwrap_err();

        assert!(matches!(err, AttachError::Backend { .. }));
        assert!(!registry.contains(&room(101)).await);
        assert_eq!(backend.subscribe_count(&room(101)), 1);
    }

    #[tokio::test]
    async fn attach_times_out() {
        let backend = Arc::new(InMemoryRoomBackend::new());
        backend.set_subscribe_delay(Duration::from_millis(200));
        let config = RegistryConfig {
            attach_timeout_ms: 20,
            ..RegistryConfig::default()
        };
        let (registry, _) = registry_with(backend.clone(), config);

        let err = registry.attach(&room(101)).await.unwrap_err();

        assert!(matches!(err, AttachError::Timeout { .. }));
        assert!(registry.is_empty().await);
        assert_eq!(backend.active_subscription_count(&room(101)), 0);
    }

    /// Backend that keeps every sink it is given, replays an empty
    /// snapshot and only then answers after `delay`.
    struct LateAckBackend {
        sinks: std::sync::Mutex<Vec<Arc<dyn RoomEventSink>>>,
        delay: Duration,
    }

    impl LateAckBackend {
        fn new(delay: Duration) -> Self {
            Self {
                sinks: std::sync::Mutex::new(Vec::new()),
                delay,
            }
        }

        async fn deliver_to_all(&self, message: MessageEvent) {
            let sinks = self.sinks.lock().unwrap().clone();
            for sink in sinks {
                sink.deliver(Some(message.clone())).await;
            }
        }
    }

    #[async_trait::async_trait]
    impl RoomBackend for LateAckBackend {
        async fn subscribe(
            &self,
            _room_id: &RoomId,
            sink: Arc<dyn RoomEventSink>,
        ) -> Result<SubscriptionHandle, BackendError> {
            self.sinks.lock().unwrap().push(sink.clone());
            sink.deliver(None).await;
            tokio::time::sleep(self.delay).await;
            Ok(SubscriptionHandle::generate())
        }

        async fn unsubscribe(&self, _handle: SubscriptionHandle) -> Result<(), BackendError> {
            Ok(())
        }
    }

    fn registry_over(
        backend: Arc<LateAckBackend>,
        config: RegistryConfig,
    ) -> (SubscriptionRegistry, Arc<RecordingNotificationSurface>) {
        let surface = Arc::new(RecordingNotificationSurface::new());
        let (router, _stream) = NotificationRouter::new(surface.clone(), ToastStyle::default());
        let context = Arc::new(SessionContext::new(UserId::new("u1").unwrap()));
        let pipeline = DeliveryPipeline::new(context, Arc::new(router));
        (SubscriptionRegistry::new(backend, pipeline, &config), surface)
    }

    #[tokio::test]
    async fn timed_out_attach_never_routes_late_messages() {
        let backend = Arc::new(LateAckBackend::new(Duration::from_millis(200)));
        let config = RegistryConfig {
            attach_timeout_ms: 20,
            ..RegistryConfig::default()
        };
        let (registry, surface) = registry_over(backend.clone(), config);

        let err = registry.attach(&room(7)).await.unwrap_err();
        assert!(matches!(err, AttachError::Timeout { .. }));

        backend.deliver_to_all(event(7, 2)).await;

        assert!(!registry.contains(&room(7)).await);
        assert_eq!(surface.presented_count(), 0);
    }

    #[tokio::test]
    async fn losing_concurrent_attach_never_routes() {
        let backend = Arc::new(LateAckBackend::new(Duration::from_millis(10)));
        let (registry, surface) = registry_over(backend.clone(), RegistryConfig::default());

        let (room_a, room_b) = (room(7), room(7));
        let (a, b) = tokio::join!(registry.attach(&room_a), registry.attach(&room_b));
        a.unwrap();
        b.unwrap();

        backend.deliver_to_all(event(7, 2)).await;

        assert_eq!(registry.len().await, 1);
        assert_eq!(surface.presented_count(), 1);
    }

    #[tokio::test]
    async fn detach_releases_handle_and_removes_entry() {
        let backend = Arc::new(InMemoryRoomBackend::new());
        let registry = registry(backend.clone());
        registry.attach(&room(101)).await.unwrap();

        registry.detach(&room(101)).await.unwrap();

        assert!(!registry.contains(&room(101)).await);
        assert_eq!(backend.unsubscribe_count(&room(101)), 1);
        assert_eq!(backend.active_subscription_count(&room(101)), 0);
    }

    #[tokio::test]
    async fn detach_unknown_room_is_noop() {
        let backend = Arc::new(InMemoryRoomBackend::new());
        let registry = registry(backend.clone());

        registry.detach(&room(101)).await.unwrap();

        assert_eq!(backend.unsubscribe_count(&room(101)), 0);
    }

    #[tokio::test]
    async fn detach_failure_still_clears_local_state() {
        let backend = Arc::new(InMemoryRoomBackend::new());
        let registry = registry(backend.clone());
        registry.attach(&room(101)).await.unwrap();
        backend.fail_unsubscribe(&room(101), BackendError::Network("offline".into()));

        let err = registry.detach(&room(101)).await.unwrap_err();

        assert!(matches!(err, DetachError::Backend { .. }));
        assert_eq!(err.room_id(), &room(101));
        assert!(!registry.contains(&room(101)).await);
    }

    #[tokio::test]
    async fn leaked_subscription_does_not_route_after_detach() {
        let backend = Arc::new(InMemoryRoomBackend::new());
        let (registry, surface) = registry_with(backend.clone(), RegistryConfig::default());
        registry.attach(&room(102)).await.unwrap();
        backend.fail_unsubscribe(&room(102), BackendError::Network("offline".into()));
        let _ = registry.detach(&room(102)).await;

        backend.publish(event(102, 5)).await;

        assert_eq!(backend.active_subscription_count(&room(102)), 1);
        assert_eq!(surface.presented_count(), 0);
    }

    #[tokio::test]
    async fn reattach_after_detach_starts_fresh() {
        let backend = Arc::new(InMemoryRoomBackend::new().without_replay());
        let registry = registry(backend.clone());
        registry.attach(&room(101)).await.unwrap();
        backend.publish(event(101, 1)).await;
        assert_eq!(registry.has_observed_first_event(&room(101)).await, Some(true));

        registry.detach(&room(101)).await.unwrap();
        registry.attach(&room(101)).await.unwrap();

        assert_eq!(registry.has_observed_first_event(&room(101)).await, Some(false));
        assert_eq!(backend.subscribe_count(&room(101)), 2);
    }

    #[tokio::test]
    async fn resync_preserves_untouched_rooms() {
        let backend = Arc::new(InMemoryRoomBackend::new().without_replay());
        let registry = registry(backend.clone());
        registry.attach(&room(1)).await.unwrap();
        registry.attach(&room(2)).await.unwrap();
        backend.publish(event(1, 1)).await;

        registry.resync([room(1), room(3)]).await.unwrap();

        assert_eq!(registry.rooms().await, vec![room(1), room(3)]);
        assert_eq!(backend.subscribe_count(&room(1)), 1);
        assert_eq!(registry.has_observed_first_event(&room(1)).await, Some(true));
        assert_eq!(backend.unsubscribe_count(&room(2)), 1);
        assert_eq!(registry.has_observed_first_event(&room(3)).await, Some(false));
    }

    #[tokio::test]
    async fn resync_collects_every_failure() {
        let backend = Arc::new(InMemoryRoomBackend::new());
        let registry = registry(backend.clone());
        registry.attach(&room(1)).await.unwrap();
        registry.attach(&room(2)).await.unwrap();
        backend.fail_unsubscribe(&room(1), BackendError::Network("offline".into()));
        backend.fail_subscribe(&room(3), BackendError::UnknownRoom);

        let err = registry.resync([room(3), room(4)]).await.unwrap_err();

        assert_eq!(err.failures().len(), 2);
        assert_eq!(err.detach_failures().next().unwrap().room_id(), &room(1));
        assert_eq!(err.attach_failures().next().unwrap().room_id(), &room(3));
        assert_eq!(registry.rooms().await, vec![room(4)]);
    }

    #[tokio::test]
    async fn detach_all_empties_registry() {
        let backend = Arc::new(InMemoryRoomBackend::new());
        let registry = registry(backend.clone());
        registry.resync([room(1), room(2), room(3)]).await.unwrap();

        registry.detach_all().await.unwrap();

        assert!(registry.is_empty().await);
        assert_eq!(registry.try_is_empty(), Some(true));
        for idx in 1..=3 {
            assert_eq!(backend.active_subscription_count(&room(idx)), 0);
        }
    }

    #[tokio::test]
    async fn concurrent_attach_keeps_single_entry() {
        let backend = Arc::new(InMemoryRoomBackend::new());
        backend.set_subscribe_delay(Duration::from_millis(10));
        let registry = registry(backend.clone());

        let (room_a, room_b) = (room(7), room(7));
        let (a, b) = tokio::join!(registry.attach(&room_a), registry.attach(&room_b));

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(registry.len().await, 1);
        assert_eq!(backend.active_subscription_count(&room(7)), 1);
    }
}
