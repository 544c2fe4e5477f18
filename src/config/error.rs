//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid attach timeout (must be 1..=300000 ms)")]
    InvalidAttachTimeout,

    #[error("Invalid detach timeout (must be 1..=300000 ms)")]
    InvalidDetachTimeout,

    #[error("Invalid notification duration")]
    InvalidNotificationDuration,

    #[error("Invalid language code: {0}")]
    InvalidLanguageCode(String),

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
}
