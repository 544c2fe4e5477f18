//! Domain layer containing routing logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `routing` - Message events and the event classifier
//! - `subscription` - Room subscription entries and their error taxonomy
//! - `notification` - Toast payloads for notify-worthy messages
//! - `i18n` - Text catalog helpers

pub mod foundation;
pub mod i18n;
pub mod notification;
pub mod routing;
pub mod subscription;
