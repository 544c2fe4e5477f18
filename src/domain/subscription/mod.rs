//! Subscription module - room subscription entries and their errors.

mod errors;
mod subscription;

pub use errors::{AttachError, BackendError, DetachError, ResyncError, ResyncFailure};
pub use subscription::{DeliveryGuard, RoomSubscription, SubscriptionHandle, SubscriptionState};
