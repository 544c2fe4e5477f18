//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the routing core to concrete collaborators:
//! - `backend` - Room backend implementations (in-memory)
//! - `notification` - Notification surfaces (recording, tracing)
//! - `identity` - Identity providers
//! - `storage` - Key-value stores
//! - `i18n` - Text catalog sources (files)

pub mod backend;
pub mod i18n;
pub mod identity;
pub mod notification;
pub mod storage;

pub use backend::InMemoryRoomBackend;
pub use i18n::FileTextSource;
pub use identity::StaticIdentityProvider;
pub use notification::{RecordingNotificationSurface, TracingNotificationSurface};
pub use storage::InMemoryKeyValueStore;
