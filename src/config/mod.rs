//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `ROOM_NOTIFIER` prefix
//! and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use room_notifier::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Attach timeout: {:?}", config.registry.attach_timeout());
//! ```

mod error;
mod i18n;
mod notification;
mod registry;
mod telemetry;

pub use error::{ConfigError, ValidationError};
pub use i18n::I18nConfig;
pub use notification::NotificationConfig;
pub use registry::RegistryConfig;
pub use telemetry::TelemetryConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a usable config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Attach/detach timeouts
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Toast presentation defaults
    #[serde(default)]
    pub notification: NotificationConfig,

    /// Localization
    #[serde(default)]
    pub i18n: I18nConfig,

    /// Log filter and format
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `ROOM_NOTIFIER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `ROOM_NOTIFIER__REGISTRY__ATTACH_TIMEOUT_MS=2000` -> `registry.attach_timeout_ms = 2000`
    /// - `ROOM_NOTIFIER__I18N__DEFAULT_LANGUAGE=ko` -> `i18n.default_language = "ko"`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ROOM_NOTIFIER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load and validate in one step
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.registry.validate()?;
        self.notification.validate()?;
        self.i18n.validate()?;
        self.telemetry.validate()?;
        Ok(())
    }
}
