//! Subscription registry configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const MAX_TIMEOUT_MS: u64 = 300_000;

/// Backend call timeouts for attach and detach.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Subscribe timeout in milliseconds
    #[serde(default = "default_attach_timeout")]
    pub attach_timeout_ms: u64,

    /// Unsubscribe timeout in milliseconds
    #[serde(default = "default_detach_timeout")]
    pub detach_timeout_ms: u64,
}

impl RegistryConfig {
    pub fn attach_timeout(&self) -> Duration {
        Duration::from_millis(self.attach_timeout_ms)
    }

    pub fn detach_timeout(&self) -> Duration {
        Duration::from_millis(self.detach_timeout_ms)
    }

    /// Validate registry configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.attach_timeout_ms == 0 || self.attach_timeout_ms > MAX_TIMEOUT_MS {
            return Err(ValidationError::InvalidAttachTimeout);
        }
        if self.detach_timeout_ms == 0 || self.detach_timeout_ms > MAX_TIMEOUT_MS {
            return Err(ValidationError::InvalidDetachTimeout);
        }
        Ok(())
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            attach_timeout_ms: default_attach_timeout(),
            detach_timeout_ms: default_detach_timeout(),
        }
    }
}

fn default_attach_timeout() -> u64 {
    10_000
}

fn default_detach_timeout() -> u64 {
    5_000
}
