//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the routing core and the outside world. Adapters implement these ports.
//!
//! ## Core Ports
//!
//! - `RoomBackend` - Subscribe to and release room message streams
//! - `RoomEventSink` - Per-subscription delivery callback
//! - `NotificationSurface` - Shows toasts for notify-worthy messages
//! - `IdentityProvider` - Reports the local user
//!
//! ## Collaborator Ports
//!
//! - `KeyValueStore` - Persisted settings (language preference)
//! - `TextSource` - Localized text catalogs

mod identity_provider;
mod key_value_store;
mod notification_surface;
mod room_backend;
mod text_source;

pub use identity_provider::IdentityProvider;
pub use key_value_store::KeyValueStore;
pub use notification_surface::NotificationSurface;
pub use room_backend::{RoomBackend, RoomEventSink};
pub use text_source::TextSource;
