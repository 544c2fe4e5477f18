//! Room Notifier - room subscriptions and message routing for chat clients
//!
//! Keeps a registry of live room subscriptions against a real-time backend
//! and routes each incoming message either to the active conversation
//! stream or to an in-app toast notification.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
