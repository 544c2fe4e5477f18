//! In-memory room backend for testing.
//!
//! Mimics a real-time database that replays a room's current value on
//! subscribe and then pushes every new message to all subscribers.
//!
//! # Security Note
//!
//! This adapter is for **testing only** and should not be used in production.
//! It uses `.expect()` on lock operations which will panic if locks are poisoned.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::domain::foundation::RoomId;
use crate::domain::routing::MessageEvent;
use crate::domain::subscription::{BackendError, SubscriptionHandle};
use crate::ports::{RoomBackend, RoomEventSink};

struct Listener {
    room_id: RoomId,
    sink: Arc<dyn RoomEventSink>,
}

#[derive(Default)]
struct Calls {
    subscribe: HashMap<RoomId, usize>,
    unsubscribe: HashMap<RoomId, usize>,
}

#[derive(Default)]
struct Faults {
    subscribe: HashMap<RoomId, BackendError>,
    unsubscribe: HashMap<RoomId, BackendError>,
    subscribe_delay: Option<Duration>,
}

/// In-memory room backend for testing.
///
/// Features:
/// - Replays the last message (or `None`) to every new subscriber
/// - Sequential delivery to subscribers of a room
/// - Call counting and per-room failure injection
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
///
/// # Example
///
/// ```ignore
/// let backend = Arc::new(InMemoryRoomBackend::new());
/// registry.attach(&room_id).await?;
/// backend.publish(event).await;
/// assert_eq!(backend.subscribe_count(&room_id), 1);
/// ```
pub struct InMemoryRoomBackend {
    listeners: RwLock<HashMap<String, Listener>>,
    last_messages: RwLock<HashMap<RoomId, MessageEvent>>,
    calls: RwLock<Calls>,
    faults: RwLock<Faults>,
    replay_on_subscribe: bool,
}

impl InMemoryRoomBackend {
    /// Creates a backend that replays the current value on subscribe.
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            last_messages: RwLock::new(HashMap::new()),
            calls: RwLock::new(Calls::default()),
            faults: RwLock::new(Faults::default()),
            replay_on_subscribe: true,
        }
    }

    /// Disables the snapshot replay on subscribe.
    pub fn without_replay(mut self) -> Self {
        self.replay_on_subscribe = false;
        self
    }

    // === Driving ===

    /// Sets the current value of a room without delivering it.
    pub fn seed_message(&self, event: MessageEvent) {
        self.last_messages
            .write()
            .expect("InMemoryRoomBackend: messages write lock poisoned")
            .insert(event.room_id.clone(), event);
    }

    /// Stores `event` as the room's current value and delivers it to every
    /// subscriber of the room, one after another.
    pub async fn publish(&self, event: MessageEvent) {
        self.seed_message(event.clone());

        // Clone sinks to release lock before await points
        let sinks: Vec<Arc<dyn RoomEventSink>> = {
            let listeners = self
                .listeners
                .read()
                .expect("InMemoryRoomBackend: listeners lock poisoned");
            listeners
                .values()
                .filter(|l| l.room_id == event.room_id)
                .map(|l| l.sink.clone())
                .collect()
        };

        for sink in sinks {
            sink.deliver(Some(event.clone())).await;
        }
    }

    // === Fault Injection ===

    /// Makes every subscribe call for `room_id` fail with `error`.
    pub fn fail_subscribe(&self, room_id: &RoomId, error: BackendError) {
        self.faults
            .write()
            .expect("InMemoryRoomBackend: faults write lock poisoned")
            .subscribe
            .insert(room_id.clone(), error);
    }

    /// Makes every unsubscribe call for `room_id` fail with `error`.
    ///
    /// The backend subscription stays alive, like a real leak.
    pub fn fail_unsubscribe(&self, room_id: &RoomId, error: BackendError) {
        self.faults
            .write()
            .expect("InMemoryRoomBackend: faults write lock poisoned")
            .unsubscribe
            .insert(room_id.clone(), error);
    }

    /// Delays every subscribe call by `delay`.
    pub fn set_subscribe_delay(&self, delay: Duration) {
        self.faults
            .write()
            .expect("InMemoryRoomBackend: faults write lock poisoned")
            .subscribe_delay = Some(delay);
    }

    /// Removes all injected failures and delays.
    pub fn clear_faults(&self) {
        *self
            .faults
            .write()
            .expect("InMemoryRoomBackend: faults write lock poisoned") = Faults::default();
    }

    // === Test Helpers ===

    /// Number of subscribe calls made for `room_id`.
    pub fn subscribe_count(&self, room_id: &RoomId) -> usize {
        self.calls
            .read()
            .expect("InMemoryRoomBackend: calls lock poisoned")
            .subscribe
            .get(room_id)
            .copied()
            .unwrap_or(0)
    }

    /// Number of unsubscribe calls made for `room_id`.
    pub fn unsubscribe_count(&self, room_id: &RoomId) -> usize {
        self.calls
            .read()
            .expect("InMemoryRoomBackend: calls lock poisoned")
            .unsubscribe
            .get(room_id)
            .copied()
            .unwrap_or(0)
    }

    /// Number of live backend subscriptions for `room_id`.
    pub fn active_subscription_count(&self, room_id: &RoomId) -> usize {
        self.listeners
            .read()
            .expect("InMemoryRoomBackend: listeners lock poisoned")
            .values()
            .filter(|l| &l.room_id == room_id)
            .count()
    }
}

impl Default for InMemoryRoomBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomBackend for InMemoryRoomBackend {
    async fn subscribe(
        &self,
        room_id: &RoomId,
        sink: Arc<dyn RoomEventSink>,
    ) -> Result<SubscriptionHandle, BackendError> {
        *self
            .calls
            .write()
            .expect("InMemoryRoomBackend: calls write lock poisoned")
            .subscribe
            .entry(room_id.clone())
            .or_default() += 1;

        let (failure, delay) = {
            let faults = self
                .faults
                .read()
                .expect("InMemoryRoomBackend: faults lock poisoned");
            (faults.subscribe.get(room_id).cloned(), faults.subscribe_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = failure {
            return Err(error);
        }

        let handle = SubscriptionHandle::generate();
        self.listeners
            .write()
            .expect("InMemoryRoomBackend: listeners write lock poisoned")
            .insert(
                handle.as_str().to_string(),
                Listener {
                    room_id: room_id.clone(),
                    sink: sink.clone(),
                },
            );

        if self.replay_on_subscribe {
            let snapshot = self
                .last_messages
                .read()
                .expect("InMemoryRoomBackend: messages lock poisoned")
                .get(room_id)
                .cloned();
            sink.deliver(snapshot).await;
        }

        Ok(handle)
    }

    async fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<(), BackendError> {
        let room_id = self
            .listeners
            .read()
            .expect("InMemoryRoomBackend: listeners lock poisoned")
            .get(handle.as_str())
            .map(|l| l.room_id.clone())
            .ok_or(BackendError::UnknownHandle)?;

        *self
            .calls
            .write()
            .expect("InMemoryRoomBackend: calls write lock poisoned")
            .unsubscribe
            .entry(room_id.clone())
            .or_default() += 1;

        let failure = self
            .faults
            .read()
            .expect("InMemoryRoomBackend: faults lock poisoned")
            .unsubscribe
            .get(&room_id)
            .cloned();
        if let Some(error) = failure {
            return Err(error);
        }

        self.listeners
            .write()
            .expect("InMemoryRoomBackend: listeners write lock poisoned")
            .remove(handle.as_str());
        Ok(())
    }
}
