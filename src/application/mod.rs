//! Application layer - Session orchestration over the routing core.
//!
//! - `registry` - `SubscriptionRegistry`, the set of listened rooms
//! - `delivery` - Backend callback feeding classifier and router
//! - `router` - `NotificationRouter` and the current-room stream
//! - `session` - `ChatSession`, built at login and ended at logout
//! - `i18n` - `Translator` for localized texts

pub mod delivery;
pub mod i18n;
pub mod registry;
pub mod router;
pub mod session;

pub use delivery::{DeliveryPipeline, SessionContext, SubscriptionDelivery};
pub use i18n::{Translator, LANGUAGE_CODE_KEY};
pub use registry::SubscriptionRegistry;
pub use router::{CurrentRoomStream, NotificationRouter};
pub use session::{ChatSession, SessionDependencies, CLOSE_BUTTON_TEXT_CODE};
