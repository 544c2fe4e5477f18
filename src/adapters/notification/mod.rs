//! Notification surface adapters.
//!
//! - `RecordingNotificationSurface` - Captures toasts for test assertions
//! - `TracingNotificationSurface` - Logs toasts (headless clients)

mod recording;
mod tracing_surface;

pub use recording::RecordingNotificationSurface;
pub use tracing_surface::TracingNotificationSurface;
