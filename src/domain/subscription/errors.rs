//! Subscription error taxonomy.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::domain::foundation::RoomId;

/// Failure reported by a room backend for a subscribe or unsubscribe call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("Network failure: {0}")]
    Network(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Unknown room")]
    UnknownRoom,

    #[error("Unknown subscription handle")]
    UnknownHandle,

    #[error("Backend error: {0}")]
    Other(String),
}

/// Subscribing to a room failed. Never retried internally.
#[derive(Debug, Clone, Error)]
pub enum AttachError {
    #[error("Failed to subscribe to room {room_id}: {source}")]
    Backend {
        room_id: RoomId,
        #[source]
        source: BackendError,
    },

    #[error("Subscribing to room {room_id} timed out after {timeout:?}")]
    Timeout { room_id: RoomId, timeout: Duration },
}

impl AttachError {
    /// Room the failed attach was for.
    pub fn room_id(&self) -> &RoomId {
        match self {
            AttachError::Backend { room_id, .. } | AttachError::Timeout { room_id, .. } => room_id,
        }
    }
}

/// Releasing a room subscription failed.
///
/// The registry entry is already gone when this is returned; the backend
/// subscription may have leaked.
#[derive(Debug, Clone, Error)]
pub enum DetachError {
    #[error("Failed to unsubscribe from room {room_id}: {source}")]
    Backend {
        room_id: RoomId,
        #[source]
        source: BackendError,
    },

    #[error("Unsubscribing from room {room_id} timed out after {timeout:?}")]
    Timeout { room_id: RoomId, timeout: Duration },
}

impl DetachError {
    /// Room the failed detach was for.
    pub fn room_id(&self) -> &RoomId {
        match self {
            DetachError::Backend { room_id, .. } | DetachError::Timeout { room_id, .. } => room_id,
        }
    }
}

/// One failed step of a resync batch.
#[derive(Debug, Clone, Error)]
pub enum ResyncFailure {
    #[error(transparent)]
    Attach(#[from] AttachError),

    #[error(transparent)]
    Detach(#[from] DetachError),
}

impl ResyncFailure {
    pub fn room_id(&self) -> &RoomId {
        match self {
            ResyncFailure::Attach(e) => e.room_id(),
            ResyncFailure::Detach(e) => e.room_id(),
        }
    }
}

/// Every failure collected during a resync (or session teardown).
#[derive(Debug, Clone, Error)]
pub struct ResyncError {
    failures: Vec<ResyncFailure>,
}

impl ResyncError {
    pub fn new(failures: Vec<ResyncFailure>) -> Self {
        Self { failures }
    }

    pub fn failures(&self) -> &[ResyncFailure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<ResyncFailure> {
        self.failures
    }

    /// Attach failures only.
    pub fn attach_failures(&self) -> impl Iterator<Item = &AttachError> {
        self.failures.iter().filter_map(|f| match f {
            ResyncFailure::Attach(e) => Some(e),
            ResyncFailure::Detach(_) => None,
        })
    }

    /// Detach failures only.
    pub fn detach_failures(&self) -> impl Iterator<Item = &DetachError> {
        self.failures.iter().filter_map(|f| match f {
            ResyncFailure::Detach(e) => Some(e),
            ResyncFailure::Attach(_) => None,
        })
    }
}

impl fmt::Display for ResyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resync finished with {} failure(s)", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "; {}", failure)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_error_mentions_room_and_cause() {
        let err = AttachError::Backend {
            room_id: RoomId::from(101),
            source: BackendError::PermissionDenied("not a member".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Failed to subscribe to room 101: Permission denied: not a member"
        );
    }

    #[test]
    fn resync_error_splits_failures_by_kind() {
        let err = ResyncError::new(vec![
            AttachError::Timeout {
                room_id: RoomId::from(1),
                timeout: Duration::from_secs(1),
            }
            .into(),
            DetachError::Backend {
                room_id: RoomId::from(2),
                source: BackendError::Network("reset".to_string()),
            }
            .into(),
        ]);

        assert_eq!(err.failures().len(), 2);
        assert_eq!(err.attach_failures().count(), 1);
        assert_eq!(err.detach_failures().next().unwrap().room_id(), &RoomId::from(2));
        assert!(err.to_string().starts_with("Resync finished with 2 failure(s)"));
    }
}
