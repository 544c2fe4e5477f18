//! Room backend adapters.
//!
//! - `InMemoryRoomBackend` - Deterministic in-process backend for testing

mod in_memory;

pub use in_memory::InMemoryRoomBackend;
