//! Routing module - message events and their classification.

mod classifier;
mod decision;
mod message;

pub use classifier::classify;
pub use decision::{RoutingContext, RoutingDecision};
pub use message::MessageEvent;
